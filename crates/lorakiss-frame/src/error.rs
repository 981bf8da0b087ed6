/// Errors that can occur during KISS frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A frame boundary marker is missing or misplaced.
    #[error("framing error: {0}")]
    Framing(&'static str),

    /// An escape byte was followed by something other than TFEND/TFESC.
    #[error("invalid escape sequence 0xDB 0x{0:02X}")]
    InvalidEscape(u8),

    /// The payload ended in the middle of an escape sequence.
    #[error("truncated escape sequence at end of payload")]
    TruncatedEscape,

    /// The command nibble is not a data frame.
    #[error(
        "unsupported KISS command {name} (0x{0:02X})",
        name = crate::command::command_byte_name(*.0)
    )]
    UnsupportedCommand(u8),

    /// The frame exceeds the configured maximum size.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
