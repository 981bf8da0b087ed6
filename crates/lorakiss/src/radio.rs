//! UDP stand-in for the LoRa radio.
//!
//! Each datagram is one packet on the air: datagrams received on the bind
//! address are handed to the bridge as receptions, and transmissions are
//! sent as datagrams to the peer address.

use std::io::{self, ErrorKind};
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use lorakiss_bridge::{Bridge, BridgeError, Radio, RadioPacket};
use tracing::{debug, warn};

const RECEIVE_POLL: Duration = Duration::from_millis(250);
const MAX_DATAGRAM: usize = 512;

pub struct UdpRadio {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpRadio {
    pub fn bind(bind: &str, peer: &str) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind)?;
        let peer = std::net::ToSocketAddrs::to_socket_addrs(peer)?
            .next()
            .ok_or_else(|| io::Error::new(ErrorKind::NotFound, format!("unresolved {peer}")))?;
        Ok(Self { socket, peer })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// A second handle for the receive thread.
    pub fn receiver(&self) -> io::Result<UdpSocket> {
        let socket = self.socket.try_clone()?;
        socket.set_read_timeout(Some(RECEIVE_POLL))?;
        Ok(socket)
    }
}

impl Radio for UdpRadio {
    fn transmit(&mut self, payload: &[u8]) -> lorakiss_bridge::Result<()> {
        self.socket
            .send_to(payload, self.peer)
            .map_err(|err| BridgeError::Radio(format!("send to {}: {err}", self.peer)))?;
        Ok(())
    }

    fn channel_busy(&mut self, _timeout: Duration) -> lorakiss_bridge::Result<bool> {
        Ok(false)
    }
}

/// Feed datagrams to the bridge until `running` turns false.
pub fn receive_loop(
    socket: UdpSocket,
    bridge: Arc<Bridge>,
    running: Arc<AtomicBool>,
    rssi: i32,
    snr: f32,
) {
    let mut buf = [0u8; MAX_DATAGRAM];
    while running.load(Ordering::SeqCst) {
        match socket.recv_from(&mut buf) {
            Ok((size, from)) => {
                debug!(%from, size, "radio datagram");
                let packet = RadioPacket::new(Bytes::copy_from_slice(&buf[..size]), rssi, snr);
                // Dropped packets are reported by the bridge.
                let _ = bridge.handle_radio_packet(&packet);
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(err) => {
                warn!(error = %err, "radio receive failed");
                break;
            }
        }
    }
}
