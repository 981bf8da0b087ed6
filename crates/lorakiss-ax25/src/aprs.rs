//! APRS payload helpers.
//!
//! The first payload byte of an APRS frame is the data type identifier. It
//! only steers bridge policy (signal reports, third-party unwrapping); the
//! codec never interprets the rest of the payload.

/// Prefix of every path-notation packet sent over LoRa ("<\xff\x01").
pub const LORA_APRS_HEADER: [u8; 3] = [0x3C, 0xFF, 0x01];

/// Identifiers of position reports.
pub const POSITION_TYPES: &[u8] = b"!'/@`";

/// Identifier of messages, bulletins and announcements.
pub const MESSAGE_TYPE: u8 = b':';

/// Identifier of third-party (encapsulated) traffic.
pub const THIRD_PARTY_TYPE: u8 = b'}';

/// APRS data type of a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Position(u8),
    /// Fixed-width addressee follows the type byte; nothing may be appended.
    Message,
    ThirdParty,
    Other(u8),
}

impl DataType {
    /// Classify a payload by its first byte; `None` for an empty payload.
    pub fn of(payload: &[u8]) -> Option<Self> {
        payload.first().map(|&byte| Self::from_byte(byte))
    }

    pub fn from_byte(byte: u8) -> Self {
        match byte {
            MESSAGE_TYPE => DataType::Message,
            THIRD_PARTY_TYPE => DataType::ThirdParty,
            b if POSITION_TYPES.contains(&b) => DataType::Position(b),
            other => DataType::Other(other),
        }
    }

    pub fn is_message(self) -> bool {
        self == DataType::Message
    }

    /// Short name for logs.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Position(_) => "position",
            DataType::Message => "message",
            DataType::ThirdParty => "third-party",
            DataType::Other(_) => "other",
        }
    }
}

/// Split the LoRa-APRS header off a radio payload, if present.
pub fn strip_lora_header(payload: &[u8]) -> Option<&[u8]> {
    payload.strip_prefix(&LORA_APRS_HEADER[..])
}
