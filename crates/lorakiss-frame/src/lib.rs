//! KISS framing for the network side of the TNC.
//!
//! Every frame on the wire is:
//! - A `FEND` (0xC0) start marker
//! - One command byte (high nibble: port, low nibble: command)
//! - The byte-stuffed payload (`FEND` → `FESC TFEND`, `FESC` → `FESC TFESC`)
//! - A `FEND` end marker
//!
//! [`FrameDelimiter`] extracts delimited frames from an arbitrarily chunked
//! byte stream; [`decode_frame`] and [`encode_frame`] convert between a
//! delimited frame and its command byte plus raw payload.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod command;
pub mod delimiter;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::KissCodec;
pub use codec::{
    decode_frame, encode_frame, escape, unescape, FrameConfig, KissFrame, DEFAULT_MAX_FRAME,
};
pub use command::{CMD_DATA, FEND, FESC, TFEND, TFESC};
pub use delimiter::{DelimiterState, FrameDelimiter};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
