use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use bytes::Bytes;
use lorakiss_transport::KissStream;

use crate::codec::{decode_frame, FrameConfig, KissFrame};
use crate::delimiter::FrameDelimiter;
use crate::error::{FrameError, Result};

/// Reads complete KISS frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames,
/// in the order they appeared on the stream.
pub struct FrameReader<T> {
    inner: T,
    delimiter: FrameDelimiter,
    pending: VecDeque<Bytes>,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            delimiter: FrameDelimiter::with_max_frame_size(config.max_frame_size),
            pending: VecDeque::new(),
            config,
        }
    }

    /// Read the next delimited frame, markers included (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached; a
    /// partially received frame is discarded.
    pub fn read_frame(&mut self) -> Result<Bytes> {
        let mut chunk = vec![0u8; self.config.read_chunk_size.max(1)];
        loop {
            if let Some(frame) = self.pending.pop_front() {
                return Ok(frame);
            }

            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                self.delimiter.reset();
                return Err(FrameError::ConnectionClosed);
            }

            let pending = &mut self.pending;
            self.delimiter
                .parse(&chunk[..read], |frame| pending.push_back(frame));
        }
    }

    /// Read and decode the next frame (blocking).
    pub fn read_kiss_frame(&mut self) -> Result<KissFrame> {
        let raw = self.read_frame()?;
        decode_frame(&raw)
    }

    /// Drop buffered and partial frames.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.delimiter.reset();
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<KissStream> {
    /// Create a frame reader for `KissStream` and apply read timeout from config.
    pub fn with_config_tcp(inner: KissStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: lorakiss_transport::TransportError) -> FrameError {
    match err {
        lorakiss_transport::TransportError::Io(io)
        | lorakiss_transport::TransportError::Accept(io) => FrameError::Io(io),
        lorakiss_transport::TransportError::Bind { source, .. }
        | lorakiss_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::encode_frame;
    use crate::command::{CMD_DATA, FEND};

    fn wire(payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(CMD_DATA, payload, &mut buf);
        buf.to_vec()
    }

    #[test]
    fn read_single_frame() {
        let mut reader = FrameReader::new(Cursor::new(wire(b"hello")));
        let frame = reader.read_kiss_frame().unwrap();

        assert!(frame.is_data());
        assert_eq!(frame.payload.as_ref(), b"hello");
    }

    #[test]
    fn read_multiple_frames_from_one_chunk() {
        let mut stream = wire(b"one");
        stream.extend(wire(b"two"));
        stream.extend(wire(b"three"));

        let mut reader = FrameReader::new(Cursor::new(stream));

        let f1 = reader.read_kiss_frame().unwrap();
        let f2 = reader.read_kiss_frame().unwrap();
        let f3 = reader.read_kiss_frame().unwrap();

        assert_eq!(f1.payload.as_ref(), b"one");
        assert_eq!(f2.payload.as_ref(), b"two");
        assert_eq!(f3.payload.as_ref(), b"three");
        assert!(matches!(
            reader.read_frame(),
            Err(FrameError::ConnectionClosed)
        ));
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: wire(&[0x01, FEND, 0x02]),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_kiss_frame().unwrap();
        assert_eq!(frame.payload.as_ref(), &[0x01, FEND, 0x02]);
    }

    #[test]
    fn small_read_chunks() {
        let cfg = FrameConfig {
            read_chunk_size: 3,
            ..FrameConfig::default()
        };
        let mut reader = FrameReader::with_config(Cursor::new(wire(b"chunked payload")), cfg);
        let frame = reader.read_kiss_frame().unwrap();
        assert_eq!(frame.payload.as_ref(), b"chunked payload");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let partial = wire(b"only-part");
        let mut reader = FrameReader::new(Cursor::new(partial[..5].to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            state: 0,
            bytes: wire(b"ok"),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let frame = framed.read_kiss_frame().unwrap();
        assert_eq!(frame.payload.as_ref(), b"ok");
    }

    #[test]
    fn roundtrip_over_tcp() {
        let listener = lorakiss_transport::KissListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr();

        let client = std::thread::spawn(move || {
            let stream = lorakiss_transport::KissListener::connect(addr).unwrap();
            let mut writer = crate::writer::FrameWriter::new(stream);
            writer.send_data(b"first").unwrap();
            writer.send_data(&[FEND, 0xDB]).unwrap();
        });

        let stream = listener.accept().unwrap();
        let mut reader = FrameReader::with_config_tcp(stream, FrameConfig::default()).unwrap();
        assert_eq!(reader.read_kiss_frame().unwrap().payload.as_ref(), b"first");
        assert_eq!(
            reader.read_kiss_frame().unwrap().payload.as_ref(),
            &[FEND, 0xDB]
        );

        client.join().unwrap();
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        let _ = reader.get_ref();
        let _ = reader.get_mut();
        assert_eq!(reader.config().read_chunk_size, 1024);
        reader.reset();
        let _inner = reader.into_inner();
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        state: u8,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.state == 0 {
                self.state = 1;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
