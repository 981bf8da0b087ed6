use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

/// Something the bridge did or refused to do.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    ClientConnected { peer: u64, addr: Option<SocketAddr> },
    ClientDisconnected { peer: u64 },
    /// Accepting or setting up a client failed; the server keeps listening.
    AcceptFailed { reason: String },
    /// A client frame was translated and queued for transmission.
    FrameQueued { size: usize, queued: usize },
    /// A frame was discarded; processing continues with the next one.
    FrameDropped { reason: String },
    /// The transmit loop found the channel busy and left the queue alone.
    ChannelBusy { queued: usize },
    Transmitted { size: usize },
    TransmitFailed { reason: String },
    /// A radio packet was translated and written to `peers` clients.
    Received {
        size: usize,
        rssi: i32,
        snr: f32,
        peers: usize,
    },
}

/// Receives bridge events.
pub trait EventSink: Send + Sync {
    fn record(&self, event: &BridgeEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &BridgeEvent) {
        match event {
            BridgeEvent::ClientConnected { peer, addr } => {
                info!(peer, addr = ?addr, "KISS client connected")
            }
            BridgeEvent::ClientDisconnected { peer } => info!(peer, "KISS client disconnected"),
            BridgeEvent::AcceptFailed { reason } => warn!(error = %reason, "KISS accept failed"),
            BridgeEvent::FrameQueued { size, queued } => {
                debug!(size, queued, "frame queued for transmission")
            }
            BridgeEvent::FrameDropped { reason } => warn!(error = %reason, "frame dropped"),
            BridgeEvent::ChannelBusy { queued } => debug!(queued, "channel busy, holding queue"),
            BridgeEvent::Transmitted { size } => info!(size, "LoRa TX"),
            BridgeEvent::TransmitFailed { reason } => warn!(error = %reason, "LoRa TX failed"),
            BridgeEvent::Received {
                size,
                rssi,
                snr,
                peers,
            } => info!(size, rssi, snr, peers, "LoRa RX"),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<BridgeEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the events recorded so far.
    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<BridgeEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &BridgeEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
    }
}
