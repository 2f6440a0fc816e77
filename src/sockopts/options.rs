//! Per-scope socket option record.
//!
//! # Responsibilities
//! - Hold the five optional listener socket settings for one server scope
//! - Merge a child scope's record over its parent's
//! - Expand a record into the ordered list of options to apply
//!
//! # Design Decisions
//! - `Option<T>` is both the value and the "explicitly set" flag
//! - Nothing is defaulted: an unset field is never applied
//! - Merge is field-wise, no field depends on another

use serde::{Deserialize, Serialize};

/// Two-field time value handed to `SO_SNDTIMEO` / `SO_RCVTIMEO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Timeval {
    /// Whole seconds.
    pub secs: i64,
    /// Additional microseconds.
    pub micros: i64,
}

impl Timeval {
    /// Whole-second value with a zero microsecond part.
    pub fn from_secs(secs: i64) -> Self {
        Self { secs, micros: 0 }
    }

    pub(crate) fn to_libc(self) -> libc::timeval {
        libc::timeval {
            tv_sec: self.secs as libc::time_t,
            tv_usec: self.micros as libc::suseconds_t,
        }
    }
}

/// Socket options configured for one server scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SocketOptionsConfig {
    /// `TCP_DEFER_ACCEPT` seconds.
    pub defer_accept: Option<i32>,
    /// `SO_SNDTIMEO`.
    pub send_timeout: Option<Timeval>,
    /// `SO_RCVTIMEO`.
    pub receive_timeout: Option<Timeval>,
    /// `SO_SNDBUF` bytes.
    pub send_buffer_size: Option<i32>,
    /// `SO_RCVBUF` bytes.
    pub receive_buffer_size: Option<i32>,
}

impl SocketOptionsConfig {
    /// An empty record: every option unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compose `child` over `parent`.
    ///
    /// Each field comes from the child when the child set it, otherwise from
    /// the parent (which may itself be unset).
    pub fn merge(parent: &Self, child: &Self) -> Self {
        Self {
            defer_accept: child.defer_accept.or(parent.defer_accept),
            send_timeout: child.send_timeout.or(parent.send_timeout),
            receive_timeout: child.receive_timeout.or(parent.receive_timeout),
            send_buffer_size: child.send_buffer_size.or(parent.send_buffer_size),
            receive_buffer_size: child.receive_buffer_size.or(parent.receive_buffer_size),
        }
    }

    /// True when no option is set.
    pub fn is_empty(&self) -> bool {
        self.options().next().is_none()
    }

    /// Set options in application order.
    pub fn options(&self) -> impl Iterator<Item = SocketOption> {
        [
            self.defer_accept.map(SocketOption::DeferAccept),
            self.send_timeout.map(SocketOption::SendTimeout),
            self.receive_timeout.map(SocketOption::ReceiveTimeout),
            self.send_buffer_size.map(SocketOption::SendBuffer),
            self.receive_buffer_size.map(SocketOption::ReceiveBuffer),
        ]
        .into_iter()
        .flatten()
    }
}

/// Identifies one of the tunable socket options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OptionKind {
    TcpDeferAccept,
    SendTimeout,
    ReceiveTimeout,
    SendBuffer,
    ReceiveBuffer,
}

impl OptionKind {
    /// Protocol level name as written in `setsockopt(2)`.
    pub fn level_name(&self) -> &'static str {
        match self {
            OptionKind::TcpDeferAccept => "IPPROTO_TCP",
            _ => "SOL_SOCKET",
        }
    }

    /// Option name as written in `setsockopt(2)`.
    pub fn option_name(&self) -> &'static str {
        match self {
            OptionKind::TcpDeferAccept => "TCP_DEFER_ACCEPT",
            OptionKind::SendTimeout => "SO_SNDTIMEO",
            OptionKind::ReceiveTimeout => "SO_RCVTIMEO",
            OptionKind::SendBuffer => "SO_SNDBUF",
            OptionKind::ReceiveBuffer => "SO_RCVBUF",
        }
    }

    /// Whether this platform has the option at all.
    ///
    /// `TCP_DEFER_ACCEPT` only exists on Linux.
    pub fn is_supported(&self) -> bool {
        match self {
            OptionKind::TcpDeferAccept => cfg!(any(target_os = "linux", target_os = "android")),
            _ => true,
        }
    }
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "setsockopt({}, {})", self.level_name(), self.option_name())
    }
}

/// A single option with the exact value to hand to the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOption {
    DeferAccept(i32),
    SendTimeout(Timeval),
    ReceiveTimeout(Timeval),
    SendBuffer(i32),
    ReceiveBuffer(i32),
}

impl SocketOption {
    pub fn kind(&self) -> OptionKind {
        match self {
            SocketOption::DeferAccept(_) => OptionKind::TcpDeferAccept,
            SocketOption::SendTimeout(_) => OptionKind::SendTimeout,
            SocketOption::ReceiveTimeout(_) => OptionKind::ReceiveTimeout,
            SocketOption::SendBuffer(_) => OptionKind::SendBuffer,
            SocketOption::ReceiveBuffer(_) => OptionKind::ReceiveBuffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a record with the fields selected by `mask` set to values derived from `seed`.
    fn with_mask(mask: u8, seed: i32) -> SocketOptionsConfig {
        let mut cfg = SocketOptionsConfig::new();
        if mask & 0b00001 != 0 {
            cfg.defer_accept = Some(seed + 1);
        }
        if mask & 0b00010 != 0 {
            cfg.send_timeout = Some(Timeval::from_secs(i64::from(seed) + 2));
        }
        if mask & 0b00100 != 0 {
            cfg.receive_timeout = Some(Timeval::from_secs(i64::from(seed) + 3));
        }
        if mask & 0b01000 != 0 {
            cfg.send_buffer_size = Some(seed + 4);
        }
        if mask & 0b10000 != 0 {
            cfg.receive_buffer_size = Some(seed + 5);
        }
        cfg
    }

    #[test]
    fn new_record_is_empty() {
        let cfg = SocketOptionsConfig::new();
        assert!(cfg.is_empty());
        assert_eq!(cfg.options().count(), 0);
    }

    #[test]
    fn merge_is_field_independent() {
        for parent_mask in 0u8..32 {
            for child_mask in 0u8..32 {
                let parent = with_mask(parent_mask, 100);
                let child = with_mask(child_mask, 200);
                let merged = SocketOptionsConfig::merge(&parent, &child);

                let pick = |bit: u8| {
                    if child_mask & bit != 0 {
                        &child
                    } else {
                        &parent
                    }
                };
                assert_eq!(merged.defer_accept, pick(0b00001).defer_accept);
                assert_eq!(merged.send_timeout, pick(0b00010).send_timeout);
                assert_eq!(merged.receive_timeout, pick(0b00100).receive_timeout);
                assert_eq!(merged.send_buffer_size, pick(0b01000).send_buffer_size);
                assert_eq!(merged.receive_buffer_size, pick(0b10000).receive_buffer_size);
            }
        }
    }

    #[test]
    fn merge_with_empty_child_inherits_parent() {
        let parent = with_mask(0b11111, 7);
        let merged = SocketOptionsConfig::merge(&parent, &SocketOptionsConfig::new());
        assert_eq!(merged, parent);
    }

    #[test]
    fn options_follow_application_order() {
        let cfg = with_mask(0b11111, 0);
        let kinds: Vec<_> = cfg.options().map(|o| o.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                OptionKind::TcpDeferAccept,
                OptionKind::SendTimeout,
                OptionKind::ReceiveTimeout,
                OptionKind::SendBuffer,
                OptionKind::ReceiveBuffer,
            ]
        );
    }

    #[test]
    fn option_kind_display_names_the_call() {
        assert_eq!(
            OptionKind::TcpDeferAccept.to_string(),
            "setsockopt(IPPROTO_TCP, TCP_DEFER_ACCEPT)"
        );
        assert_eq!(OptionKind::ReceiveBuffer.to_string(), "setsockopt(SOL_SOCKET, SO_RCVBUF)");
    }
}
