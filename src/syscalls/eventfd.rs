/*!
 * Eventfd
 * Kernel counter usable as a wait/notify primitive
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

/// Creation flags for [`eventfd`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EfdFlag {
    CloExec,
    NonBlock,
    Semaphore,
}

#[cfg(target_os = "linux")]
fn efd_flags() -> &'static FlagTable<EfdFlag> {
    static TABLE: OnceLock<FlagTable<EfdFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("eventfd")
            .with(EfdFlag::CloExec, libc::EFD_CLOEXEC as u64)
            .with(EfdFlag::NonBlock, libc::EFD_NONBLOCK as u64)
            .with(EfdFlag::Semaphore, libc::EFD_SEMAPHORE as u64)
    })
}

/// Create an eventfd with the given initial counter
#[cfg(target_os = "linux")]
pub fn eventfd(init: u32, flags: &[EfdFlag]) -> Result<Fd> {
    require("eventfd")?;
    let bits = efd_flags().encode(flags)? as libc::c_int;
    let (fd, errno) = blocking_call(|| unsafe { libc::eventfd(init, bits) });
    if fd == -1 {
        return Err(SysError::os("eventfd", errno));
    }
    Ok(fd)
}

#[cfg(not(target_os = "linux"))]
pub fn eventfd(init: u32, flags: &[EfdFlag]) -> Result<Fd> {
    let _ = (init, flags);
    require("eventfd")?;
    Err(SysError::not_available("eventfd"))
}

/// Read the counter, blocking (or EAGAIN) while it is zero
///
/// Counter values cross the descriptor as host-order 8-byte words.
#[cfg(target_os = "linux")]
pub fn eventfd_read(fd: Fd) -> Result<u64> {
    require("eventfd")?;
    let mut value = 0u64;
    let (n, errno) = blocking_call(|| unsafe {
        libc::read(fd, &mut value as *mut u64 as *mut libc::c_void, 8)
    });
    if n != 8 {
        return Err(SysError::os("eventfd_read", if n == -1 { errno } else { libc::EINVAL }));
    }
    Ok(value)
}

#[cfg(not(target_os = "linux"))]
pub fn eventfd_read(fd: Fd) -> Result<u64> {
    let _ = fd;
    require("eventfd")?;
    Err(SysError::not_available("eventfd"))
}

/// Add to the counter, waking any blocked reader
#[cfg(target_os = "linux")]
pub fn eventfd_write(fd: Fd, value: u64) -> Result<()> {
    require("eventfd")?;
    let (n, errno) = blocking_call(|| unsafe {
        libc::write(fd, &value as *const u64 as *const libc::c_void, 8)
    });
    if n != 8 {
        return Err(SysError::os("eventfd_write", if n == -1 { errno } else { libc::EINVAL }));
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn eventfd_write(fd: Fd, value: u64) -> Result<()> {
    let _ = (fd, value);
    require("eventfd")?;
    Err(SysError::not_available("eventfd"))
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counter_accumulates_and_resets() {
        let fd = eventfd(3, &[EfdFlag::CloExec]).unwrap();
        eventfd_write(fd, 4).unwrap();
        // Plain mode: read drains the whole counter
        assert_eq!(eventfd_read(fd).unwrap(), 7);
        unsafe { libc::close(fd) };
    }

    #[test]
    fn test_semaphore_mode_decrements_by_one() {
        let fd = eventfd(2, &[EfdFlag::Semaphore]).unwrap();
        assert_eq!(eventfd_read(fd).unwrap(), 1);
        assert_eq!(eventfd_read(fd).unwrap(), 1);
        unsafe { libc::close(fd) };
    }
}
