/*!
 * Core Types
 * Common types and conversions used across the bridge
 */

use crate::core::errors::{Result, SysError};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// File descriptor handle
///
/// The bridge never owns a descriptor: it never closes one implicitly and
/// never retains it past the call.
pub type Fd = std::os::fd::RawFd;

/// Process ID type
pub type Pid = libc::pid_t;

/// User ID type
pub type Uid = libc::uid_t;

/// Group ID type
pub type Gid = libc::gid_t;

/// Convert a path to a C string, rejecting interior NUL before any syscall
#[inline]
pub(crate) fn cpath(path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| SysError::invalid_argument("path contains NUL byte"))
}

/// Convert a str to a C string, rejecting interior NUL before any syscall
#[inline]
pub(crate) fn cstr(s: &str) -> Result<CString> {
    CString::new(s).map_err(|_| SysError::invalid_argument("string contains NUL byte"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_cpath_rejects_interior_nul() {
        let bad = PathBuf::from("a\0b");
        assert!(matches!(
            cpath(&bad),
            Err(SysError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_cstr_accepts_plain_strings() {
        assert_eq!(cstr("hello").unwrap().to_bytes(), b"hello");
    }
}
