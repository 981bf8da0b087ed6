use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lorakiss_frame::FrameWriter;
use tracing::debug;

type PeerWriter = FrameWriter<Box<dyn Write + Send>>;

struct Peer {
    id: u64,
    writer: Arc<Mutex<PeerWriter>>,
}

/// Connected KISS clients that receive every radio packet.
///
/// The set lock only guards membership. Writes go through a per-client lock,
/// so a slow client never holds up `insert` or `remove`.
#[derive(Default)]
pub struct PeerSet {
    peers: Mutex<Vec<Peer>>,
}

impl PeerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client writer under `id`.
    pub fn insert(&self, id: u64, writer: PeerWriter) {
        self.lock().push(Peer {
            id,
            writer: Arc::new(Mutex::new(writer)),
        });
    }

    /// Forget a client. Returns false if it was not registered.
    pub fn remove(&self, id: u64) -> bool {
        let mut peers = self.lock();
        let before = peers.len();
        peers.retain(|peer| peer.id != id);
        peers.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write one delimited frame to every client, in registration order.
    ///
    /// Clients whose write fails are dropped from the set. Returns the number
    /// of clients that received the frame.
    pub fn broadcast(&self, wire: &[u8]) -> usize {
        let targets: Vec<(u64, Arc<Mutex<PeerWriter>>)> = self
            .lock()
            .iter()
            .map(|peer| (peer.id, Arc::clone(&peer.writer)))
            .collect();

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (id, writer) in targets {
            let result = writer
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .write_raw(wire);
            match result {
                Ok(()) => delivered += 1,
                Err(err) => {
                    debug!(peer = id, error = %err, "dropping KISS client after failed write");
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            self.lock().retain(|peer| !failed.contains(&peer.id));
        }
        delivered
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Peer>> {
        self.peers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PeerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<u64> = self.lock().iter().map(|peer| peer.id).collect();
        f.debug_struct("PeerSet").field("peers", &ids).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Stalled {
        entered: mpsc::Sender<()>,
        stall: Duration,
    }

    impl Write for Stalled {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let _ = self.entered.send(());
            thread::sleep(self.stall);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn writer(w: impl Write + Send + 'static) -> PeerWriter {
        let inner: Box<dyn Write + Send> = Box::new(w);
        FrameWriter::new(inner)
    }

    #[test]
    fn broadcast_reaches_every_peer() {
        let set = PeerSet::new();
        let a = SharedBuf::default();
        let b = SharedBuf::default();
        set.insert(1, writer(a.clone()));
        set.insert(2, writer(b.clone()));

        assert_eq!(set.broadcast(&[0xC0, 0x00, b'x', 0xC0]), 2);
        assert_eq!(*a.0.lock().expect("lock"), vec![0xC0, 0x00, b'x', 0xC0]);
        assert_eq!(*b.0.lock().expect("lock"), vec![0xC0, 0x00, b'x', 0xC0]);
    }

    #[test]
    fn failed_peer_is_removed() {
        let set = PeerSet::new();
        let ok = SharedBuf::default();
        set.insert(1, writer(Broken));
        set.insert(2, writer(ok.clone()));

        assert_eq!(set.broadcast(b"\xC0\x00a\xC0"), 1);
        assert_eq!(set.len(), 1);
        assert!(!set.remove(1));
        assert!(set.remove(2));
        assert!(set.is_empty());
        assert_eq!(set.broadcast(b"\xC0\x00b\xC0"), 0);
    }

    #[test]
    fn slow_peer_does_not_block_membership_changes() {
        let set = Arc::new(PeerSet::new());
        let (entered_tx, entered_rx) = mpsc::channel();
        set.insert(
            1,
            writer(Stalled {
                entered: entered_tx,
                stall: Duration::from_millis(800),
            }),
        );

        let broadcaster = {
            let set = Arc::clone(&set);
            thread::spawn(move || set.broadcast(b"\xC0\x00s\xC0"))
        };
        entered_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("broadcast should reach the slow peer");

        let started = Instant::now();
        set.insert(2, writer(SharedBuf::default()));
        assert_eq!(set.len(), 2);
        assert!(set.remove(2));
        assert!(started.elapsed() < Duration::from_millis(400));

        assert_eq!(broadcaster.join().expect("broadcast thread"), 1);
        assert_eq!(set.len(), 1);
    }
}
