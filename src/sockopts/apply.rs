//! Applying configured options to listening sockets.
//!
//! # Responsibilities
//! - Walk the listener registry once per (re)initialization
//! - Skip records without an allocated descriptor
//! - Issue one `setsockopt` per configured option, in a fixed order
//! - Log and record failures without stopping the pass
//!
//! # Design Decisions
//! - Best effort: a failed option never aborts startup and is never retried
//! - The system call sits behind [`SocketOptionSetter`] so the pass can be
//!   driven against a recording setter

use std::io;
use std::mem;
use std::os::fd::RawFd;

use crate::host::ListenerRegistry;
use crate::sockopts::options::{OptionKind, SocketOption, SocketOptionsConfig};

/// Sets one socket option on a raw descriptor.
pub trait SocketOptionSetter {
    fn set_option(&mut self, fd: RawFd, option: SocketOption) -> io::Result<()>;
}

impl<S: SocketOptionSetter + ?Sized> SocketOptionSetter for &mut S {
    fn set_option(&mut self, fd: RawFd, option: SocketOption) -> io::Result<()> {
        (**self).set_option(fd, option)
    }
}

/// Setter backed by `setsockopt(2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSetter;

impl SocketOptionSetter for SystemSetter {
    fn set_option(&mut self, fd: RawFd, option: SocketOption) -> io::Result<()> {
        match option {
            SocketOption::DeferAccept(secs) => set_defer_accept(fd, secs),
            SocketOption::SendTimeout(tv) => {
                setsockopt(fd, libc::SOL_SOCKET, libc::SO_SNDTIMEO, &tv.to_libc())
            }
            SocketOption::ReceiveTimeout(tv) => {
                setsockopt(fd, libc::SOL_SOCKET, libc::SO_RCVTIMEO, &tv.to_libc())
            }
            SocketOption::SendBuffer(size) => {
                setsockopt(fd, libc::SOL_SOCKET, libc::SO_SNDBUF, &(size as libc::c_int))
            }
            SocketOption::ReceiveBuffer(size) => {
                setsockopt(fd, libc::SOL_SOCKET, libc::SO_RCVBUF, &(size as libc::c_int))
            }
        }
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn set_defer_accept(fd: RawFd, secs: i32) -> io::Result<()> {
    setsockopt(fd, libc::IPPROTO_TCP, libc::TCP_DEFER_ACCEPT, &(secs as libc::c_int))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn set_defer_accept(_fd: RawFd, _secs: i32) -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}

fn setsockopt<T>(fd: RawFd, level: libc::c_int, name: libc::c_int, value: &T) -> io::Result<()> {
    // SAFETY: `value` points to a live `T` for the duration of the call and
    // the length passed is exactly its size.
    let ret = unsafe {
        libc::setsockopt(
            fd,
            level,
            name,
            value as *const T as *const libc::c_void,
            mem::size_of::<T>() as libc::socklen_t,
        )
    };
    if ret < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// An option that could not be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionFailure {
    pub fd: RawFd,
    pub kind: OptionKind,
    pub error: String,
}

/// Outcome of one pass over the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Records with an allocated descriptor.
    pub listeners_visited: usize,
    /// Records skipped for lack of a descriptor.
    pub listeners_skipped: usize,
    /// Options set successfully, in call order.
    pub applied: Vec<(RawFd, OptionKind)>,
    /// Options the kernel rejected.
    pub failed: Vec<OptionFailure>,
    /// Options this platform does not have.
    pub unsupported: usize,
}

impl ApplyReport {
    /// Number of `setsockopt` calls issued.
    pub fn attempted(&self) -> usize {
        self.applied.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Apply every option set in `config` to every allocated listener.
pub fn apply_to_listeners<S: SocketOptionSetter>(
    config: &SocketOptionsConfig,
    listeners: &ListenerRegistry,
    mut setter: S,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    // The host may initialize modules before any listener is allocated.
    if listeners.is_empty() {
        tracing::debug!("No listeners allocated yet, nothing to apply");
        return report;
    }

    for record in listeners.iter() {
        let Some(fd) = record.raw_fd() else {
            report.listeners_skipped += 1;
            continue;
        };
        report.listeners_visited += 1;

        for option in config.options() {
            let kind = option.kind();
            if !kind.is_supported() {
                tracing::debug!(fd, option = %kind, "Option not available on this platform");
                report.unsupported += 1;
                continue;
            }

            match setter.set_option(fd, option) {
                Ok(()) => {
                    tracing::debug!(fd, option = %kind, value = ?option, "Socket option set");
                    report.applied.push((fd, kind));
                }
                Err(e) => {
                    tracing::warn!(
                        fd,
                        addr = ?record.addr(),
                        error = %e,
                        "failed to {}",
                        kind
                    );
                    report.failed.push(OptionFailure {
                        fd,
                        kind,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    tracing::info!(
        listeners = report.listeners_visited,
        skipped = report.listeners_skipped,
        applied = report.applied.len(),
        failed = report.failed.len(),
        "Listener socket options applied"
    );

    report
}
