/*!
 * Splice and Tee
 * In-kernel data movement between descriptors
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::Fd;
use crate::runtime::capability::require;
use serde::{Deserialize, Serialize};

#[cfg(target_os = "linux")]
use crate::flags::FlagTable;
#[cfg(target_os = "linux")]
use crate::runtime::blocking::blocking_call;
#[cfg(target_os = "linux")]
use std::sync::OnceLock;

/// Transfer hints for [`splice`] and [`tee`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpliceFlag {
    Move,
    NonBlock,
    More,
}

#[cfg(target_os = "linux")]
fn splice_flags() -> &'static FlagTable<SpliceFlag> {
    static TABLE: OnceLock<FlagTable<SpliceFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("splice")
            .with(SpliceFlag::Move, libc::SPLICE_F_MOVE as u64)
            .with(SpliceFlag::NonBlock, libc::SPLICE_F_NONBLOCK as u64)
            .with(SpliceFlag::More, libc::SPLICE_F_MORE as u64)
    })
}

/// Move up to `len` bytes between descriptors without touching user space
///
/// At least one side must be a pipe. An explicit offset pins that side's
/// position; `None` uses and advances the descriptor position.
pub fn splice(
    fd_in: Fd,
    off_in: Option<u64>,
    fd_out: Fd,
    off_out: Option<u64>,
    len: usize,
    flags: &[SpliceFlag],
) -> Result<usize> {
    require("splice")?;
    #[cfg(target_os = "linux")]
    {
        let bits = splice_flags().encode(flags)? as libc::c_uint;
        let mut in_off = off_in.map(|o| o as libc::loff_t);
        let mut out_off = off_out.map(|o| o as libc::loff_t);
        let in_ptr = in_off
            .as_mut()
            .map_or(std::ptr::null_mut(), |o| o as *mut libc::loff_t);
        let out_ptr = out_off
            .as_mut()
            .map_or(std::ptr::null_mut(), |o| o as *mut libc::loff_t);
        let (n, errno) =
            blocking_call(|| unsafe { libc::splice(fd_in, in_ptr, fd_out, out_ptr, len, bits) });
        if n == -1 {
            return Err(SysError::os("splice", errno));
        }
        Ok(n as usize)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (fd_in, off_in, fd_out, off_out, len, flags);
        Err(SysError::not_available("splice"))
    }
}

/// Duplicate up to `len` bytes from one pipe into another, consuming nothing
pub fn tee(fd_in: Fd, fd_out: Fd, len: usize, flags: &[SpliceFlag]) -> Result<usize> {
    require("tee")?;
    #[cfg(target_os = "linux")]
    {
        let bits = splice_flags().encode(flags)? as libc::c_uint;
        let (n, errno) = blocking_call(|| unsafe { libc::tee(fd_in, fd_out, len, bits) });
        if n == -1 {
            return Err(SysError::os("tee", errno));
        }
        Ok(n as usize)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (fd_in, fd_out, len, flags);
        Err(SysError::not_available("tee"))
    }
}
