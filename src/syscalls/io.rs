/*!
 * Descriptor I/O
 * Policy-driven read/write at the fd position or an explicit offset
 *
 * All four entry points run on the chunked retry engine; the policy decides
 * what EINTR and EAGAIN mean mid-transfer. A short return count is EOF (or
 * a full pipe), never an error.
 */

use crate::core::errors::Result;
use crate::core::types::Fd;
use crate::io::retry::{read_exact_loop, write_exact_loop, RetryPolicy};

/// Read at the descriptor's current position
pub fn read(fd: Fd, buf: &mut [u8], policy: RetryPolicy) -> Result<usize> {
    read_exact_loop("read", fd, buf, None, policy)
}

/// Write at the descriptor's current position
pub fn write(fd: Fd, buf: &[u8], policy: RetryPolicy) -> Result<usize> {
    write_exact_loop("write", fd, buf, None, policy)
}

/// Read at `offset` without moving the descriptor position
pub fn pread(fd: Fd, offset: u64, buf: &mut [u8], policy: RetryPolicy) -> Result<usize> {
    read_exact_loop("pread", fd, buf, Some(offset), policy)
}

/// Write at `offset` without moving the descriptor position
pub fn pwrite(fd: Fd, offset: u64, buf: &[u8], policy: RetryPolicy) -> Result<usize> {
    write_exact_loop("pwrite", fd, buf, Some(offset), policy)
}
