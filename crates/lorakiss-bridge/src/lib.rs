//! Bridge between KISS clients on TCP and a LoRa radio.
//!
//! Frames from KISS clients are validated, translated into the radio
//! dialect and queued; a transmit loop drains the queue whenever the radio
//! reports an idle channel. Packets received by the radio are translated
//! back, tagged with a signal report and broadcast to every connected
//! client.

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod peers;
pub mod queue;
pub mod radio;
pub mod server;

pub use bridge::Bridge;
pub use config::{BridgeConfig, NewlinePolicy, ServerConfig};
pub use error::{BridgeError, Result};
pub use events::{BridgeEvent, EventSink, MemorySink, TracingSink};
pub use peers::PeerSet;
pub use queue::TxQueue;
pub use radio::{Radio, RadioPacket};
pub use server::KissServer;
