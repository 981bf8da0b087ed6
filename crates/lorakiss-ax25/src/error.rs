use crate::frame::FrameClass;

/// Errors that can occur while decoding or encoding AX.25 frames.
#[derive(Debug, thiserror::Error)]
pub enum Ax25Error {
    /// A callsign, SSID or address field is not valid.
    #[error("malformed address: {0}")]
    MalformedAddress(String),

    /// The buffer ended before the frame was complete.
    #[error("truncated frame (needed {needed} bytes, have {available})")]
    TruncatedFrame { needed: usize, available: usize },

    /// The control field selects a frame class this codec does not handle.
    #[error("unsupported frame type: {0}")]
    UnsupportedFrameType(FrameClass),

    /// More digipeaters than an AX.25 header can carry.
    #[error("too many digipeaters ({0}, max 8)")]
    TooManyDigipeaters(usize),

    /// A path-notation frame without the `:` payload separator.
    #[error("path notation frame has no ':' separator")]
    MissingPayloadSeparator,

    /// A path-notation frame without the `>` source separator.
    #[error("path notation frame has no '>' separator")]
    MissingSourceSeparator,
}

pub type Result<T> = std::result::Result<T, Ax25Error>;
