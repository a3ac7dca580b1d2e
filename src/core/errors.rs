/*!
 * Error Types
 * Structured syscall errors with thiserror, miette, and serde support
 */

use crate::core::inline_string::InlineString;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured error for every fallible operation in the bridge
///
/// Four kinds, mirroring the propagation policy:
/// - `Os`: the kernel reported failure; `errno` was captured immediately
///   after the syscall returned, before re-entering the host runtime.
/// - `NotAvailable`: the requested flag/constant/operation does not exist
///   on this platform. No syscall was attempted.
/// - `InvalidArgument`: caller-side contract violation, detected before any
///   native call.
/// - `Overflow`: a kernel-reported value cannot be represented in the
///   target integer width.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SysError {
    #[error("{op} failed (errno {errno})")]
    #[diagnostic(
        code(bridge::os_failure),
        help("The kernel rejected the call. Inspect errno and context for the cause.")
    )]
    Os {
        /// Name of the failing operation, e.g. "openat"
        op: InlineString,
        /// Platform error code captured immediately after the syscall
        errno: i32,
        /// Relevant argument (path, fd, option name) if any
        context: Option<InlineString>,
    },

    #[error("Not available on this platform: {0}")]
    #[diagnostic(
        code(bridge::not_available),
        help("The flag or operation is not supported by this OS/kernel. No syscall was attempted.")
    )]
    NotAvailable(InlineString),

    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(bridge::invalid_argument),
        help("Caller-side contract violation detected before any native call.")
    )]
    InvalidArgument(InlineString),

    #[error("Value too large: {0}")]
    #[diagnostic(
        code(bridge::overflow),
        help("A kernel-reported value does not fit the target integer width.")
    )]
    Overflow(InlineString),
}

impl SysError {
    /// OS failure with the errno captured right after the syscall
    #[inline]
    pub fn os(op: impl Into<InlineString>, errno: i32) -> Self {
        Self::Os {
            op: op.into(),
            errno,
            context: None,
        }
    }

    /// OS failure carrying the relevant argument (path, option name, ...)
    #[inline]
    pub fn os_with(
        op: impl Into<InlineString>,
        errno: i32,
        context: impl Into<InlineString>,
    ) -> Self {
        Self::Os {
            op: op.into(),
            errno,
            context: Some(context.into()),
        }
    }

    #[inline]
    pub fn not_available(what: impl Into<InlineString>) -> Self {
        Self::NotAvailable(what.into())
    }

    #[inline]
    pub fn invalid_argument(msg: impl Into<InlineString>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    #[inline]
    pub fn overflow(what: impl Into<InlineString>) -> Self {
        Self::Overflow(what.into())
    }

    /// Platform error code, if this is an OS-reported failure
    #[inline]
    #[must_use]
    pub fn errno(&self) -> Option<i32> {
        match self {
            Self::Os { errno, .. } => Some(*errno),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_not_available(&self) -> bool {
        matches!(self, Self::NotAvailable(_))
    }

    /// Human-readable message including the platform's strerror text
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Os { op, errno, context } => {
                let desc = std::io::Error::from_raw_os_error(*errno);
                match context {
                    Some(ctx) => format!("{op}: {desc} ({ctx})"),
                    None => format!("{op}: {desc}"),
                }
            }
            other => other.to_string(),
        }
    }
}

/// Result type for bridge operations
///
/// # Must Use
/// Syscall failures carry errno state that callers must not drop silently
pub type Result<T> = std::result::Result<T, SysError>;

/// Read the calling thread's errno
///
/// Must be called immediately after a failing syscall, before any other
/// call that could clobber it.
#[inline]
pub(crate) fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Reset errno before calls that use the errno==0 protocol (getpriority)
#[inline]
pub(crate) fn clear_errno() {
    #[cfg(target_os = "linux")]
    unsafe {
        *libc::__errno_location() = 0;
    }
    #[cfg(target_os = "macos")]
    unsafe {
        *libc::__error() = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_error_carries_errno_and_context() {
        let err = SysError::os_with("openat", libc::ENOENT, "/no/such/path");
        assert_eq!(err.errno(), Some(libc::ENOENT));
        assert!(err.message().contains("openat"));
        assert!(err.message().contains("/no/such/path"));
    }

    #[test]
    fn test_kinds_are_distinguishable() {
        assert!(SysError::not_available("renameat2 flag").is_not_available());
        assert!(!SysError::os("poll", libc::EINTR).is_not_available());
        assert_eq!(SysError::invalid_argument("bad index").errno(), None);
    }

    #[test]
    fn test_error_serialization_round_trip() {
        let err = SysError::os_with("statvfs", libc::EACCES, "/root");
        let json = serde_json::to_string(&err).unwrap();
        let back: SysError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}
