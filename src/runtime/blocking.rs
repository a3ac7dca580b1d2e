/*!
 * Blocking-Call Adapter
 * Release the host runtime around syscalls that may block
 *
 * The host runtime is opaque to this crate; it participates through an
 * installable pair of hooks. `blocking_call` establishes the required
 * ordering: release runtime → syscall → capture errno → reacquire runtime.
 * errno must be read before the leave hook fires, because re-entering the
 * runtime may itself issue syscalls that clobber it.
 *
 * There is no mid-syscall cancellation: once issued, a blocking call runs
 * to completion or kernel-level interruption (EINTR). Documented
 * limitation, not a bug.
 */

use crate::core::errors::last_errno;
use std::sync::{Arc, OnceLock};

/// Host-runtime notifications around native blocking sections
///
/// Both methods default to no-ops so a standalone embedder can install
/// nothing and still get correct errno capture.
pub trait RuntimeHooks: Send + Sync {
    /// The current thread is about to enter native code that may block
    fn enter_blocking(&self) {}

    /// The blocking native call returned; the thread rejoins the runtime
    fn leave_blocking(&self) {}
}

static HOOKS: OnceLock<Arc<dyn RuntimeHooks>> = OnceLock::new();

/// Install the host runtime's hooks, once per process
///
/// Returns false if hooks were already installed (the first install wins).
pub fn install_hooks(hooks: Arc<dyn RuntimeHooks>) -> bool {
    HOOKS.set(hooks).is_ok()
}

/// Run a syscall expected to block, returning its value and captured errno
///
/// The errno snapshot is taken between the call and the leave hook.
#[inline]
pub(crate) fn blocking_call<T>(f: impl FnOnce() -> T) -> (T, i32) {
    let hooks = HOOKS.get();
    if let Some(h) = hooks {
        h.enter_blocking();
    }
    let ret = f();
    let errno = last_errno();
    if let Some(h) = hooks {
        h.leave_blocking();
    }
    (ret, errno)
}

/// Run a guaranteed-non-blocking syscall, skipping the hook round-trip
#[inline]
pub(crate) fn direct_call<T>(f: impl FnOnce() -> T) -> (T, i32) {
    let ret = f();
    (ret, last_errno())
}
