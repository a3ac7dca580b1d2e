//! errno snapshot ordering against a hostile leave hook
//!
//! Lives in its own binary: hook installation is first-install-wins for
//! the whole process, so this clobbering hook set must not share a
//! process with the counting hooks of the other runtime tests.

use posix_bridge::io::RetryPolicy;
use posix_bridge::syscalls::io::read;
use posix_bridge::{install_hooks, RuntimeHooks};
use std::sync::Arc;

struct Clobber;

impl RuntimeHooks for Clobber {
    fn leave_blocking(&self) {
        // Sets errno to ENOENT
        unsafe { libc::open(b"/no/such/file\0".as_ptr().cast(), libc::O_RDONLY) };
    }
}

#[test]
fn test_errno_survives_hook_reentry() {
    // The leave hook clobbers thread errno; the captured value must not
    // change because of it.
    assert!(install_hooks(Arc::new(Clobber)));

    let mut buf = [0u8; 4];
    let err = read(-1, &mut buf, RetryPolicy::ALL).unwrap_err();
    assert_eq!(err.errno(), Some(libc::EBADF));
}
