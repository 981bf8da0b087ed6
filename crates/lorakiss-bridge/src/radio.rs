use std::time::Duration;

use bytes::Bytes;
use lorakiss_ax25::SignalReport;

use crate::error::Result;

/// The radio as seen by the transmit loop.
///
/// Reception is not part of the trait: a driver delivers received packets
/// by calling [`Bridge::handle_radio_packet`](crate::Bridge::handle_radio_packet)
/// from its own thread.
pub trait Radio {
    /// Send one payload over the air, blocking until it is on the way.
    fn transmit(&mut self, payload: &[u8]) -> Result<()>;

    /// Whether a signal is present on the channel, checked for at most
    /// `timeout`.
    fn channel_busy(&mut self, timeout: Duration) -> Result<bool>;
}

/// A packet received from the radio with its signal metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioPacket {
    pub payload: Bytes,
    pub report: SignalReport,
}

impl RadioPacket {
    pub fn new(payload: impl Into<Bytes>, rssi: i32, snr: f32) -> Self {
        Self {
            payload: payload.into(),
            report: SignalReport::new(rssi, snr),
        }
    }
}
