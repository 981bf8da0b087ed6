//! Signal-report injection for frames headed to KISS clients.

use std::fmt;

use bytes::BytesMut;
use serde::{Deserialize, Serialize};

use crate::aprs::DataType;

/// Received signal strength and signal-to-noise ratio of a radio packet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalReport {
    /// Packet RSSI in dBm.
    pub rssi: i32,
    /// Packet SNR in dB.
    pub snr: f32,
}

impl SignalReport {
    pub fn new(rssi: i32, snr: f32) -> Self {
        Self { rssi, snr }
    }
}

impl fmt::Display for SignalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level:{} dBm, SNR:{}dB", self.rssi, self.snr)
    }
}

/// Append `" " + report` to a frame, unless the payload is an APRS message.
///
/// `data_type` is the type of the frame's payload, which for binary frames
/// is not the first byte of `frame`. With `strip_newline`, exactly one
/// trailing `\n` is removed first. Returns whether the report was appended.
pub fn append_signal_report(
    frame: &mut BytesMut,
    data_type: Option<DataType>,
    report: &SignalReport,
    strip_newline: bool,
) -> bool {
    if data_type.is_some_and(DataType::is_message) {
        return false;
    }
    if strip_newline && frame.last() == Some(&b'\n') {
        frame.truncate(frame.len() - 1);
    }
    frame.extend_from_slice(b" ");
    frame.extend_from_slice(report.to_string().as_bytes());
    true
}
