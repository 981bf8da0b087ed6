//! `tokio_util::codec` adapter over [`FrameDelimiter`].

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, KissFrame, DEFAULT_MAX_FRAME};
use crate::command::command_byte;
use crate::delimiter::FrameDelimiter;
use crate::error::FrameError;

/// Decodes KISS frames from, and encodes them to, an async byte stream.
///
/// Use with `FramedRead`/`FramedWrite`/`Framed`. Malformed frames surface as
/// decode errors; the delimiter itself is already back in `Idle` by then.
#[derive(Debug)]
pub struct KissCodec {
    delimiter: FrameDelimiter,
    max_frame_size: usize,
}

impl Default for KissCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME)
    }
}

impl KissCodec {
    /// Create a codec with an explicit frame size limit.
    pub fn new(max_frame_size: usize) -> Self {
        Self {
            delimiter: FrameDelimiter::with_max_frame_size(max_frame_size),
            max_frame_size,
        }
    }
}

impl Decoder for KissCodec {
    type Item = KissFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        while src.has_remaining() {
            let byte = src.get_u8();
            if let Some(raw) = self.delimiter.feed(byte) {
                return decode_frame(&raw).map(Some);
            }
        }
        Ok(None)
    }
}

impl Encoder<KissFrame> for KissCodec {
    type Error = FrameError;

    fn encode(&mut self, item: KissFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let start = dst.len();
        encode_frame(command_byte(item.port, item.command), &item.payload, dst);
        let size = dst.len() - start;
        if size > self.max_frame_size {
            dst.truncate(start);
            return Err(FrameError::FrameTooLarge {
                size,
                max: self.max_frame_size,
            });
        }
        Ok(())
    }
}
