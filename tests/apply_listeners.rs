//! Applying options to real listening sockets.

use std::os::fd::AsRawFd;
use std::time::Duration;

use sockopts::host::{ListenRecord, ListenerRegistry};
use sockopts::net::{registry, BoundListener};
use sockopts::sockopts::{apply_to_listeners, SocketOptionsConfig, SystemSetter, Timeval};

mod common;

fn tuned() -> SocketOptionsConfig {
    SocketOptionsConfig {
        defer_accept: Some(20),
        send_timeout: Some(Timeval::from_secs(5)),
        receive_timeout: Some(Timeval::from_secs(7)),
        send_buffer_size: Some(65536),
        receive_buffer_size: Some(65536),
    }
}

#[test]
fn options_reach_the_kernel() {
    let listener = BoundListener::bind("127.0.0.1:0", 16).unwrap();
    let report = apply_to_listeners(&tuned(), &registry([&listener]), SystemSetter);

    assert!(report.is_clean(), "unexpected failures: {:?}", report.failed);
    assert_eq!(report.listeners_visited, 1);

    let socket = listener.socket();
    assert_eq!(socket.write_timeout().unwrap(), Some(Duration::from_secs(5)));
    assert_eq!(socket.read_timeout().unwrap(), Some(Duration::from_secs(7)));
    assert!(socket.send_buffer_size().unwrap() >= 65536);
    assert!(socket.recv_buffer_size().unwrap() >= 65536);

    #[cfg(target_os = "linux")]
    {
        let fd = socket.as_raw_fd();
        let defer = common::getsockopt_int(fd, libc::IPPROTO_TCP, libc::TCP_DEFER_ACCEPT);
        assert!(defer > 0);
    }
}

#[test]
fn unset_options_leave_socket_untouched() {
    let listener = BoundListener::bind("127.0.0.1:0", 16).unwrap();
    let before = listener.socket().send_buffer_size().unwrap();

    let config = SocketOptionsConfig {
        receive_timeout: Some(Timeval::from_secs(3)),
        ..Default::default()
    };
    let report = apply_to_listeners(&config, &registry([&listener]), SystemSetter);

    assert_eq!(report.attempted(), 1);
    assert_eq!(listener.socket().send_buffer_size().unwrap(), before);
    assert_eq!(listener.socket().write_timeout().unwrap(), None);
}

#[test]
fn non_socket_descriptor_fails_without_stopping_the_pass() {
    let live = BoundListener::bind("127.0.0.1:0", 16).unwrap();
    let file = tempfile::tempfile().unwrap();

    let mut listeners = ListenerRegistry::new();
    listeners.push(ListenRecord::from_raw_fd(file.as_raw_fd(), None));
    listeners.push(live.record());

    let config = SocketOptionsConfig {
        send_buffer_size: Some(32768),
        receive_buffer_size: Some(32768),
        ..Default::default()
    };
    let report = apply_to_listeners(&config, &listeners, SystemSetter);

    assert_eq!(report.listeners_visited, 2);
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed.iter().all(|f| f.fd == file.as_raw_fd()));
    assert_eq!(report.applied.len(), 2);
    assert!(live.socket().send_buffer_size().unwrap() >= 32768);
}
