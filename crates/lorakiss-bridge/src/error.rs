/// Errors that can occur while bridging KISS clients and the radio.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] lorakiss_transport::TransportError),

    /// KISS framing error.
    #[error("frame error: {0}")]
    Frame(#[from] lorakiss_frame::FrameError),

    /// AX.25 or path-notation codec error.
    #[error("link frame error: {0}")]
    Link(#[from] lorakiss_ax25::Ax25Error),

    /// The radio driver reported a failure.
    #[error("radio error: {0}")]
    Radio(String),

    /// A frame could not be produced for its destination.
    #[error("encoding failed: {0}")]
    EncodingFailure(String),

    /// Invalid bridge configuration.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
