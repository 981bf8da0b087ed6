use std::time::Duration;

use lorakiss_ax25::Dialect;
use lorakiss_frame::{FrameConfig, DEFAULT_MAX_FRAME};
use lorakiss_transport::DEFAULT_PORT;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// When to drop one trailing `\n` from a payload before appending the
/// signal report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewlinePolicy {
    /// Only for packets received in path notation.
    #[default]
    PathOnly,
    /// For packets received in either dialect.
    Always,
    /// Never.
    Never,
}

impl NewlinePolicy {
    /// Whether to strip for a packet received in `dialect`.
    pub fn applies_to(self, dialect: Dialect) -> bool {
        match self {
            NewlinePolicy::PathOnly => dialect == Dialect::PathNotation,
            NewlinePolicy::Always => true,
            NewlinePolicy::Never => false,
        }
    }
}

/// Translation and transmit behavior of a [`Bridge`](crate::Bridge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Dialect spoken on the radio side. Default: path notation.
    pub tx_dialect: Dialect,
    /// Append `Level:… dBm, SNR:…dB` to non-message packets sent to clients.
    pub append_signal_report: bool,
    pub strip_newline: NewlinePolicy,
    /// Prefix path-notation transmissions with the LoRa-APRS header.
    pub lora_header: bool,
    /// Transmit only the inner packet of third-party (`}`) payloads.
    pub unwrap_third_party: bool,
    /// Delay between transmit queue polls.
    pub poll_interval_ms: u64,
    /// Upper bound for one channel activity check.
    pub busy_timeout_ms: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tx_dialect: Dialect::PathNotation,
            append_signal_report: true,
            strip_newline: NewlinePolicy::default(),
            lora_header: true,
            unwrap_third_party: false,
            poll_interval_ms: 500,
            busy_timeout_ms: 1000,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON document; missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// Default bound on a single client write, in milliseconds.
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 2000;

/// Settings of the KISS TCP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address. Default: `0.0.0.0:10001`.
    pub bind: String,
    /// Bytes requested per socket read. Default: 1 KiB.
    pub read_chunk_size: usize,
    /// Largest delimited frame accepted from a client. Default: 64 KiB.
    pub max_frame_size: usize,
    pub read_timeout_ms: Option<u64>,
    /// Bound on one write to a client; a client that stays unwritable this
    /// long is dropped. Default: 2 s.
    pub write_timeout_ms: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: format!("0.0.0.0:{DEFAULT_PORT}"),
            read_chunk_size: 1024,
            max_frame_size: DEFAULT_MAX_FRAME,
            read_timeout_ms: None,
            write_timeout_ms: Some(DEFAULT_WRITE_TIMEOUT_MS),
        }
    }
}

impl ServerConfig {
    /// Frame reader/writer settings for one client connection.
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig {
            max_frame_size: self.max_frame_size,
            read_chunk_size: self.read_chunk_size,
            read_timeout: self.read_timeout_ms.map(Duration::from_millis),
            write_timeout: self.write_timeout_ms.map(Duration::from_millis),
        }
    }
}
