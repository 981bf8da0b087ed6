//! TCP transport for the KISS side of the TNC.
//!
//! APRS digipeaters and clients (aprx, Dire Wolf, APRSdroid) connect to the
//! TNC over a plain TCP stream and exchange KISS frames. This crate owns the
//! socket plumbing: binding, accepting, connecting and stream timeouts.
//! Everything else builds on the [`KissStream`] type provided here.

pub mod error;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use tcp::KissListener;
pub use traits::KissStream;

/// Default KISS-over-TCP port used by aprx and Dire Wolf setups.
pub const DEFAULT_PORT: u16 = 10001;
