//! LoRa APRS KISS TNC.
//!
//! Bridges KISS clients (APRS software talking KISS over TCP) to a LoRa
//! radio, translating between AX.25 binary frames and the path notation
//! used by LoRa-APRS trackers.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP listener and stream for the KISS side
//! - [`frame`]: KISS byte stuffing and streaming frame delimiting
//! - [`ax25`]: AX.25 address and UI frame codec, path notation, signal reports
//! - [`bridge`]: transmit queue, radio trait, KISS server and event sink

/// Re-export transport types.
pub mod transport {
    pub use lorakiss_transport::*;
}

/// Re-export KISS frame types.
pub mod frame {
    pub use lorakiss_frame::*;
}

/// Re-export AX.25 codec types.
pub mod ax25 {
    pub use lorakiss_ax25::*;
}

/// Re-export bridge types.
pub mod bridge {
    pub use lorakiss_bridge::*;
}
