//! Streaming KISS frame delimiter.
//!
//! A byte-at-a-time state machine that turns an arbitrarily chunked byte
//! stream into complete `FEND ... FEND` frames. It holds the only state that
//! survives between reads of a connection: the partially accumulated frame.

use bytes::{Bytes, BytesMut};
use tracing::{trace, warn};

use crate::codec::DEFAULT_MAX_FRAME;
use crate::command::FEND;

/// Where the delimiter is within the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterState {
    /// Between frames; non-marker bytes are discarded.
    Idle,
    /// A start marker was seen, waiting for the first body byte.
    Started,
    /// Accumulating the frame body until the end marker.
    InBody,
}

/// Extracts delimited frames from a byte stream.
///
/// Emitted frames include both markers, e.g. `C0 00 .. C0`. Back-to-back
/// markers never produce a frame: a marker seen while waiting for the first
/// body byte drops the delimiter back to `Idle`.
#[derive(Debug)]
pub struct FrameDelimiter {
    state: DelimiterState,
    buf: BytesMut,
    max_frame_size: usize,
}

impl Default for FrameDelimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDelimiter {
    /// Create a delimiter with the default frame size limit.
    pub fn new() -> Self {
        Self::with_max_frame_size(DEFAULT_MAX_FRAME)
    }

    /// Create a delimiter that drops frames longer than `max_frame_size`.
    pub fn with_max_frame_size(max_frame_size: usize) -> Self {
        Self {
            state: DelimiterState::Idle,
            buf: BytesMut::new(),
            max_frame_size: max_frame_size.max(2),
        }
    }

    /// Current state.
    pub fn state(&self) -> DelimiterState {
        self.state
    }

    /// Bytes accumulated for the frame in progress.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop any partial frame and return to `Idle`.
    ///
    /// Called whenever the underlying connection is replaced.
    pub fn reset(&mut self) {
        self.state = DelimiterState::Idle;
        self.buf.clear();
    }

    /// Feed one byte; returns a frame when `byte` completes one.
    pub fn feed(&mut self, byte: u8) -> Option<Bytes> {
        match self.state {
            DelimiterState::Idle => {
                if byte == FEND {
                    self.buf.clear();
                    self.buf.extend_from_slice(&[FEND]);
                    self.state = DelimiterState::Started;
                }
                None
            }
            DelimiterState::Started => {
                if byte == FEND {
                    self.reset();
                } else {
                    self.buf.extend_from_slice(&[byte]);
                    self.state = DelimiterState::InBody;
                }
                None
            }
            DelimiterState::InBody => {
                self.buf.extend_from_slice(&[byte]);
                if byte == FEND {
                    let frame = self.buf.split().freeze();
                    self.state = DelimiterState::Idle;
                    trace!(size = frame.len(), "frame delimited");
                    return Some(frame);
                }
                if self.buf.len() >= self.max_frame_size {
                    warn!(
                        size = self.buf.len(),
                        max = self.max_frame_size,
                        "discarding oversized frame"
                    );
                    self.reset();
                }
                None
            }
        }
    }

    /// Feed a chunk, invoking `on_frame` for every frame it completes, in order.
    pub fn parse<F>(&mut self, chunk: &[u8], mut on_frame: F)
    where
        F: FnMut(Bytes),
    {
        for &byte in chunk {
            if let Some(frame) = self.feed(byte) {
                on_frame(frame);
            }
        }
    }

    /// Feed a chunk and collect the frames it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Bytes> {
        let mut frames = Vec::new();
        self.parse(chunk, |frame| frames.push(frame));
        frames
    }
}
