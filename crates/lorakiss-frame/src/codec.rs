use bytes::{BufMut, Bytes, BytesMut};

use crate::command::{command_byte, split_command_byte, CMD_DATA, FEND, FESC, TFEND, TFESC};
use crate::error::{FrameError, Result};

/// Default maximum size of one delimited frame on the wire: 64 KiB.
///
/// LoRa payloads top out at 255 bytes; the limit only bounds memory when a
/// client streams garbage without ever closing a frame.
pub const DEFAULT_MAX_FRAME: usize = 64 * 1024;

/// A decoded KISS frame: command byte plus unescaped payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KissFrame {
    /// TNC port (high nibble of the command byte).
    pub port: u8,
    /// Command (low nibble of the command byte).
    pub command: u8,
    /// The unescaped payload.
    pub payload: Bytes,
}

impl KissFrame {
    /// Create a data frame on port 0.
    pub fn data(payload: impl Into<Bytes>) -> Self {
        Self {
            port: 0,
            command: CMD_DATA,
            payload: payload.into(),
        }
    }

    /// True when this frame carries a link-layer frame.
    pub fn is_data(&self) -> bool {
        self.command == CMD_DATA
    }

    /// The payload of a data frame, or `UnsupportedCommand` for anything else.
    pub fn data_payload(&self) -> Result<&Bytes> {
        if self.is_data() {
            Ok(&self.payload)
        } else {
            Err(FrameError::UnsupportedCommand(command_byte(
                self.port,
                self.command,
            )))
        }
    }

    /// The escaped, delimited wire form of this frame.
    pub fn to_wire(&self) -> Bytes {
        let mut dst = BytesMut::with_capacity(self.payload.len() + 4);
        encode_frame(command_byte(self.port, self.command), &self.payload, &mut dst);
        dst.freeze()
    }
}

/// Escape the two reserved bytes of a payload.
///
/// `FEND` becomes `FESC TFEND`, `FESC` becomes `FESC TFESC`; every other
/// byte passes through.
pub fn escape(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 8);
    escape_into(data, &mut out);
    out
}

fn escape_into(data: &[u8], dst: &mut impl BufMut) {
    for &byte in data {
        match byte {
            FEND => {
                dst.put_u8(FESC);
                dst.put_u8(TFEND);
            }
            FESC => {
                dst.put_u8(FESC);
                dst.put_u8(TFESC);
            }
            other => dst.put_u8(other),
        }
    }
}

/// Reverse [`escape`].
///
/// An escape byte followed by anything but `TFEND`/`TFESC`, or a trailing
/// lone escape byte, is an error rather than being passed through.
pub fn unescape(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut bytes = data.iter().copied();
    while let Some(byte) = bytes.next() {
        if byte != FESC {
            out.push(byte);
            continue;
        }
        match bytes.next() {
            Some(TFEND) => out.push(FEND),
            Some(TFESC) => out.push(FESC),
            Some(other) => return Err(FrameError::InvalidEscape(other)),
            None => return Err(FrameError::TruncatedEscape),
        }
    }
    Ok(out)
}

/// Encode a payload into a delimited KISS frame.
///
/// Wire format:
/// ```text
/// ┌──────┬─────────┬──────────────────────┬──────┐
/// │ FEND │ Command │ Escaped payload      │ FEND │
/// │ 0xC0 │ (1B)    │ (0..n bytes)         │ 0xC0 │
/// └──────┴─────────┴──────────────────────┴──────┘
/// ```
pub fn encode_frame(command: u8, payload: &[u8], dst: &mut BytesMut) {
    dst.reserve(payload.len() + 4);
    dst.put_u8(FEND);
    escape_into(&[command], dst);
    escape_into(payload, dst);
    dst.put_u8(FEND);
}

/// Decode one delimited frame (as emitted by [`crate::FrameDelimiter`]).
///
/// The frame must start and end with `FEND` and hold at least the command
/// byte between them.
pub fn decode_frame(frame: &[u8]) -> Result<KissFrame> {
    if frame.len() < 2 || frame[0] != FEND {
        return Err(FrameError::Framing("missing start marker"));
    }
    if frame[frame.len() - 1] != FEND {
        return Err(FrameError::Framing("missing end marker"));
    }

    let inner = &frame[1..frame.len() - 1];
    if inner.contains(&FEND) {
        return Err(FrameError::Framing("marker inside frame body"));
    }

    let body = unescape(inner)?;
    let Some((&command, payload)) = body.split_first() else {
        return Err(FrameError::Framing("missing command byte"));
    };

    let (port, command) = split_command_byte(command);
    Ok(KissFrame {
        port,
        command,
        payload: Bytes::copy_from_slice(payload),
    })
}

/// Configuration for KISS frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum delimited frame size in bytes. Default: 64 KiB.
    pub max_frame_size: usize,
    /// Bytes requested from the transport per read call. Default: 1 KiB.
    pub read_chunk_size: usize,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME,
            read_chunk_size: 1024,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
