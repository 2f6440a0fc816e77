//! Shared helpers for integration tests.

use std::io::{self, Write};
use std::os::fd::RawFd;

use sockopts::sockopts::{SocketOption, SocketOptionSetter};
use tempfile::NamedTempFile;

/// Records every call and fails those whose option name is listed.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingSetter {
    pub calls: Vec<(RawFd, SocketOption)>,
    pub fail_options: Vec<&'static str>,
}

impl SocketOptionSetter for RecordingSetter {
    fn set_option(&mut self, fd: RawFd, option: SocketOption) -> io::Result<()> {
        self.calls.push((fd, option));
        if self.fail_options.contains(&option.kind().option_name()) {
            Err(io::Error::from_raw_os_error(libc::ENOPROTOOPT))
        } else {
            Ok(())
        }
    }
}

/// Write `contents` to a fresh temporary config file.
#[allow(dead_code)]
pub fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Replace the contents of an existing config file.
#[allow(dead_code)]
pub fn rewrite_config(file: &NamedTempFile, contents: &str) {
    std::fs::write(file.path(), contents).unwrap();
}

/// Read an `int` socket option back from the kernel.
#[allow(dead_code)]
pub fn getsockopt_int(fd: RawFd, level: libc::c_int, name: libc::c_int) -> i32 {
    let mut value: libc::c_int = 0;
    let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;
    let ret = unsafe {
        libc::getsockopt(
            fd,
            level,
            name,
            &mut value as *mut _ as *mut libc::c_void,
            &mut len,
        )
    };
    assert_eq!(ret, 0, "getsockopt failed: {}", io::Error::last_os_error());
    value
}
