//! Listener registry.
//!
//! The host keeps one record per `Listen` address. A record exists before its
//! socket is allocated, so the descriptor is optional: the module initializer
//! can run while the registry holds only unallocated records, or none at all.

use std::net::SocketAddr;
use std::os::fd::RawFd;

/// One listening socket as the host tracks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenRecord {
    fd: Option<RawFd>,
    addr: Option<SocketAddr>,
}

impl ListenRecord {
    /// A record whose socket has not been allocated yet.
    pub fn unallocated(addr: Option<SocketAddr>) -> Self {
        Self { fd: None, addr }
    }

    /// A record for an allocated descriptor. Negative descriptors are
    /// treated as unallocated.
    pub fn from_raw_fd(fd: RawFd, addr: Option<SocketAddr>) -> Self {
        Self {
            fd: (fd >= 0).then_some(fd),
            addr,
        }
    }

    /// The descriptor, if the socket is allocated.
    pub fn raw_fd(&self) -> Option<RawFd> {
        self.fd
    }

    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }
}

/// Ordered set of listener records, each visited once per walk.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    records: Vec<ListenRecord>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ListenRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListenRecord> {
        self.records.iter()
    }
}

impl FromIterator<ListenRecord> for ListenerRegistry {
    fn from_iter<I: IntoIterator<Item = ListenRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
