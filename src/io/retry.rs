/*!
 * Partial I/O Retry Engine
 * Chunked read/write loops with a composable interruption policy
 *
 * One engine serves read, write, pread, and pwrite. Each iteration issues
 * a single blocking syscall bounded by an internal chunk size, then applies
 * the policy to the outcome: zero bytes ends the transfer (success with a
 * short count), EINTR may redo the chunk, EAGAIN after progress may end the
 * transfer with the partial count, anything else propagates.
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::Fd;
use crate::runtime::blocking::blocking_call;
use serde::{Deserialize, Serialize};
use std::os::raw::c_void;

/// Upper bound on bytes handed to the kernel per iteration
///
/// Matches the classic unix I/O buffer size; keeps any pinned native
/// buffer bounded.
pub const CHUNK_SIZE: usize = 65536;

/// Per-call-site policy for the retry loop
///
/// Immutable during a call. The three bits compose into the four named
/// conventions below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Stop after the first successful chunk, whatever remains
    pub single_attempt: bool,
    /// Treat EAGAIN/EWOULDBLOCK as end-of-transfer once bytes have moved
    pub tolerate_eagain: bool,
    /// Redo the same chunk on EINTR instead of propagating
    pub retry_intr: bool,
}

impl RetryPolicy {
    /// Loop to completion: retry EINTR, propagate EAGAIN
    pub const ALL: Self = Self {
        single_attempt: false,
        tolerate_eagain: false,
        retry_intr: true,
    };

    /// One attempt only, nothing retried
    pub const SINGLE: Self = Self {
        single_attempt: true,
        tolerate_eagain: false,
        retry_intr: false,
    };

    /// Tolerate both: retry EINTR, stop with partial count on EAGAIN
    pub const DEFAULT: Self = Self {
        single_attempt: false,
        tolerate_eagain: true,
        retry_intr: true,
    };

    /// Interrupt-sensitive: propagate EINTR, stop with partial count on EAGAIN
    pub const INTR: Self = Self {
        single_attempt: false,
        tolerate_eagain: true,
        retry_intr: false,
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Outcome of one raw chunk syscall: byte count (or -1) plus captured errno
type ChunkResult = (isize, i32);

fn run_loop(
    op: &'static str,
    total: usize,
    policy: RetryPolicy,
    mut issue: impl FnMut(usize, usize) -> ChunkResult,
) -> Result<usize> {
    let mut processed = 0usize;

    while processed < total {
        let want = (total - processed).min(CHUNK_SIZE);
        let (ret, errno) = issue(processed, want);

        if ret == 0 {
            break; // EOF, or the fd accepts nothing more
        }
        if ret < 0 {
            if errno == libc::EINTR && policy.retry_intr {
                continue;
            }
            if (errno == libc::EAGAIN || errno == libc::EWOULDBLOCK)
                && processed > 0
                && policy.tolerate_eagain
            {
                break;
            }
            return Err(SysError::os(op, errno));
        }

        processed += ret as usize;
        if policy.single_attempt {
            break;
        }
    }

    Ok(processed)
}

/// Read into `buf`, at `offset` when given (pread) or the fd position (read)
///
/// Returns the byte count actually transferred; a short count is EOF, not
/// an error. The buffer is borrowed only for the duration of the call.
pub fn read_exact_loop(
    op: &'static str,
    fd: Fd,
    buf: &mut [u8],
    offset: Option<u64>,
    policy: RetryPolicy,
) -> Result<usize> {
    let base = buf.as_mut_ptr();
    run_loop(op, buf.len(), policy, |done, want| {
        let ptr = unsafe { base.add(done) } as *mut c_void;
        let at = offset.map(|o| o + done as u64);
        blocking_call(|| unsafe {
            match at {
                Some(o) => libc::pread(fd, ptr, want, o as libc::off_t),
                None => libc::read(fd, ptr, want),
            }
        })
    })
}

/// Write from `buf`, at `offset` when given (pwrite) or the fd position (write)
pub fn write_exact_loop(
    op: &'static str,
    fd: Fd,
    buf: &[u8],
    offset: Option<u64>,
    policy: RetryPolicy,
) -> Result<usize> {
    let base = buf.as_ptr();
    run_loop(op, buf.len(), policy, |done, want| {
        let ptr = unsafe { base.add(done) } as *const c_void;
        let at = offset.map(|o| o + done as u64);
        blocking_call(|| unsafe {
            match at {
                Some(o) => libc::pwrite(fd, ptr, want, o as libc::off_t),
                None => libc::write(fd, ptr, want),
            }
        })
    })
}
