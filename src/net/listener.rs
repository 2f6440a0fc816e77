//! Listening socket allocation.
//!
//! # Responsibilities
//! - Parse and bind configured listen addresses
//! - Keep the sockets alive for the server's lifetime
//! - Describe them to the module as listener records
//!
//! # Design Decisions
//! - Sockets are built with socket2 so the raw descriptor is available
//! - Binding happens once; graceful restarts reuse the same sockets

use std::net::{AddrParseError, SocketAddr};
use std::os::fd::AsRawFd;

use socket2::{Domain, Protocol, Socket, Type};
use thiserror::Error;

use crate::host::{ListenRecord, ListenerRegistry};

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// Address did not parse.
    #[error("Invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: AddrParseError,
    },
    /// Failed to create, bind or listen.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// A bound, listening TCP socket.
#[derive(Debug)]
pub struct BoundListener {
    socket: Socket,
    local_addr: SocketAddr,
}

impl BoundListener {
    /// Bind `addr` and start listening with the given backlog.
    pub fn bind(addr: &str, backlog: i32) -> Result<Self, ListenerError> {
        let parsed: SocketAddr = addr.parse().map_err(|source| ListenerError::InvalidAddress {
            addr: addr.to_string(),
            source,
        })?;
        let bind_err = |source| ListenerError::Bind {
            addr: parsed,
            source,
        };

        let socket = Socket::new(Domain::for_address(parsed), Type::STREAM, Some(Protocol::TCP))
            .map_err(bind_err)?;
        socket.set_reuse_address(true).map_err(bind_err)?;
        socket.bind(&parsed.into()).map_err(bind_err)?;
        socket.listen(backlog).map_err(bind_err)?;

        let local_addr = socket
            .local_addr()
            .map_err(bind_err)?
            .as_socket()
            .unwrap_or(parsed);

        tracing::info!(address = %local_addr, fd = socket.as_raw_fd(), "Listener bound");

        Ok(Self { socket, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn socket(&self) -> &Socket {
        &self.socket
    }

    /// The record the module initializer sees for this socket.
    pub fn record(&self) -> ListenRecord {
        ListenRecord::from_raw_fd(self.socket.as_raw_fd(), Some(self.local_addr))
    }
}

/// Bind every address in order. Fails on the first address that cannot be bound.
pub fn bind_all(addrs: &[String], backlog: i32) -> Result<Vec<BoundListener>, ListenerError> {
    addrs
        .iter()
        .map(|addr| BoundListener::bind(addr, backlog))
        .collect()
}

/// Registry describing `listeners`, valid while they stay alive.
pub fn registry<'a>(listeners: impl IntoIterator<Item = &'a BoundListener>) -> ListenerRegistry {
    listeners.into_iter().map(BoundListener::record).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binds_ephemeral_port() {
        let listener = BoundListener::bind("127.0.0.1:0", 16).unwrap();
        assert_ne!(listener.local_addr().port(), 0);
        assert!(listener.record().raw_fd().is_some());
        assert_eq!(listener.record().addr(), Some(listener.local_addr()));
    }

    #[test]
    fn rejects_bad_address() {
        let err = BoundListener::bind("localhost", 16).unwrap_err();
        assert!(matches!(err, ListenerError::InvalidAddress { .. }));
    }

    #[test]
    fn registry_lists_every_listener() {
        let listeners = bind_all(&["127.0.0.1:0".into(), "127.0.0.1:0".into()], 16).unwrap();
        let registry = registry(&listeners);
        assert_eq!(registry.len(), 2);
        assert!(registry.iter().all(|r| r.raw_fd().is_some()));
    }
}
