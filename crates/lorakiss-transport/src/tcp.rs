use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::KissStream;

/// TCP listener for KISS clients.
///
/// Provides bind/accept/connect over plain TCP. Digipeater software such as
/// aprx is configured with `tcp-device <host> <port> KISS` and connects here.
pub struct KissListener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl KissListener {
    /// Bind and listen on a TCP address such as `0.0.0.0:10001`.
    ///
    /// Port `0` picks an ephemeral port; see [`KissListener::local_addr`].
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let label = addr.to_string();
        let listener = TcpListener::bind(&addr).map_err(|e| TransportError::Bind {
            addr: label.clone(),
            source: e,
        })?;
        let local_addr = listener.local_addr().map_err(|e| TransportError::Bind {
            addr: label,
            source: e,
        })?;

        info!(%local_addr, "listening for KISS clients");

        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<KissStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(%peer, "accepted connection");
        Ok(KissStream::from_tcp(stream))
    }

    /// Connect to a listening KISS TCP server (blocking).
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<KissStream> {
        let label = addr.to_string();
        let mut resolved = addr.to_socket_addrs().map_err(|e| TransportError::Connect {
            addr: label.clone(),
            source: e,
        })?;
        let target = resolved
            .next()
            .ok_or_else(|| TransportError::Unresolved(label.clone()))?;
        let stream = TcpStream::connect(target).map_err(|e| TransportError::Connect {
            addr: label,
            source: e,
        })?;
        debug!(%target, "connected to KISS server");
        Ok(KissStream::from_tcp(stream))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
