use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

/// Unbounded FIFO of radio-ready payloads.
///
/// Cloning yields another handle to the same queue. `push` never blocks on
/// anything but the internal lock, so client reader threads are never held
/// up by the radio.
#[derive(Debug, Clone, Default)]
pub struct TxQueue {
    inner: Arc<Mutex<VecDeque<Bytes>>>,
}

impl TxQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, payload: Bytes) {
        self.lock().push_back(payload);
    }

    /// Oldest payload, if any.
    pub fn try_pop(&self) -> Option<Bytes> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Bytes>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
