use std::io::{ErrorKind, Write};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use lorakiss_frame::{FrameError, FrameReader, FrameWriter};
use lorakiss_transport::{KissListener, KissStream};
use tracing::{debug, info, warn};

use crate::bridge::Bridge;
use crate::config::ServerConfig;
use crate::error::{BridgeError, Result};
use crate::events::BridgeEvent;

/// Pause after a failed `accept` before trying again.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Accepts KISS clients over TCP and feeds their frames to a [`Bridge`].
///
/// Every client gets its own reader thread and its own frame delimiter, so
/// a partial frame from one client never mixes with another's bytes.
pub struct KissServer {
    listener: KissListener,
    bridge: Arc<Bridge>,
    config: ServerConfig,
    next_peer_id: AtomicU64,
}

impl KissServer {
    /// Bind the listen address from `config`.
    pub fn bind(config: ServerConfig, bridge: Arc<Bridge>) -> Result<Self> {
        let listener = KissListener::bind(config.bind.as_str())?;
        info!(addr = %listener.local_addr(), "KISS server listening");
        Ok(Self {
            listener,
            bridge,
            config,
            next_peer_id: AtomicU64::new(1),
        })
    }

    /// Bound address.
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    /// Accept the next client and serve it on a new thread.
    ///
    /// The client is registered for radio broadcasts before this returns.
    pub fn accept(&self) -> Result<JoinHandle<()>> {
        let stream = self.listener.accept()?;
        self.serve(stream)
    }

    /// Register an accepted client and start its reader thread.
    fn serve(&self, stream: KissStream) -> Result<JoinHandle<()>> {
        let id = self.next_peer_id.fetch_add(1, Ordering::Relaxed);
        let frame_config = self.config.frame_config();

        stream.set_nodelay(true)?;
        let writer_stream = stream.try_clone()?;
        writer_stream.set_write_timeout(frame_config.write_timeout)?;
        let addr = stream.peer_addr();
        let reader = FrameReader::with_config_tcp(stream, frame_config.clone())?;

        let writer: Box<dyn Write + Send> = Box::new(writer_stream);
        self.bridge
            .peers()
            .insert(id, FrameWriter::with_config(writer, frame_config));
        self.bridge
            .record(BridgeEvent::ClientConnected { peer: id, addr });

        let bridge = Arc::clone(&self.bridge);
        Ok(thread::spawn(move || serve_client(bridge, id, reader)))
    }

    /// Accept clients until `running` turns false.
    ///
    /// `running` is checked between connections; a blocked accept returns
    /// on the next incoming connection. Accept and client setup failures are
    /// recorded and the loop carries on.
    pub fn run(&self, running: &AtomicBool) {
        self.run_with(running, || self.listener.accept().map_err(BridgeError::from));
    }

    fn run_with<A>(&self, running: &AtomicBool, mut accept: A)
    where
        A: FnMut() -> Result<KissStream>,
    {
        while running.load(Ordering::SeqCst) {
            let stream = match accept() {
                Ok(stream) => stream,
                Err(_) if !running.load(Ordering::SeqCst) => break,
                Err(err) => {
                    warn!(error = %err, "KISS accept failed");
                    self.bridge.record(BridgeEvent::AcceptFailed {
                        reason: err.to_string(),
                    });
                    thread::sleep(ACCEPT_RETRY_DELAY);
                    continue;
                }
            };

            if let Err(err) = self.serve(stream) {
                warn!(error = %err, "KISS client setup failed");
                self.bridge.record(BridgeEvent::AcceptFailed {
                    reason: err.to_string(),
                });
            }
        }
    }
}

fn serve_client(bridge: Arc<Bridge>, id: u64, mut reader: FrameReader<KissStream>) {
    loop {
        match reader.read_frame() {
            Ok(frame) => {
                // Failures are reported through the event sink.
                let _ = bridge.handle_kiss_frame(&frame);
            }
            Err(FrameError::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                continue
            }
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => {
                debug!(peer = id, error = %err, "KISS client read failed");
                break;
            }
        }
    }

    if let Err(err) = reader.get_ref().shutdown() {
        debug!(peer = id, error = %err, "socket shutdown failed");
    }
    bridge.peers().remove(id);
    bridge.record(BridgeEvent::ClientDisconnected { peer: id });
}
