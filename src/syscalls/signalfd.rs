/*!
 * Signalfd
 * Signals delivered as descriptor reads
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::Fd;
use crate::runtime::capability::require;
use serde::{Deserialize, Serialize};

#[cfg(target_os = "linux")]
use crate::flags::FlagTable;
#[cfg(target_os = "linux")]
use crate::marshal::SignalfdSiginfo;
#[cfg(target_os = "linux")]
use crate::runtime::blocking::blocking_call;
#[cfg(target_os = "linux")]
use std::sync::OnceLock;

/// Creation flags for [`signalfd`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SfdFlag {
    NonBlock,
    CloExec,
}

#[cfg(target_os = "linux")]
fn sfd_flags() -> &'static FlagTable<SfdFlag> {
    static TABLE: OnceLock<FlagTable<SfdFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("signalfd")
            .with(SfdFlag::NonBlock, libc::SFD_NONBLOCK as u64)
            .with(SfdFlag::CloExec, libc::SFD_CLOEXEC as u64)
    })
}

/// Create or update a signal descriptor for the given signal numbers
///
/// With `fd` of `None` a new descriptor is created; otherwise the existing
/// one's mask is replaced. The signals must be blocked separately for
/// delivery to arrive here instead of a handler.
#[cfg(target_os = "linux")]
pub fn signalfd(fd: Option<Fd>, signals: &[i32], flags: &[SfdFlag]) -> Result<Fd> {
    require("signalfd")?;
    let bits = sfd_flags().encode(flags)? as libc::c_int;
    let mut mask: libc::sigset_t = unsafe { std::mem::zeroed() };
    unsafe { libc::sigemptyset(&mut mask) };
    for &sig in signals {
        if unsafe { libc::sigaddset(&mut mask, sig) } == -1 {
            return Err(SysError::invalid_argument(format!("signal number {sig}")));
        }
    }
    let (ret, errno) =
        blocking_call(|| unsafe { libc::signalfd(fd.unwrap_or(-1), &mask, bits) });
    if ret == -1 {
        return Err(SysError::os("signalfd", errno));
    }
    Ok(ret)
}

#[cfg(not(target_os = "linux"))]
pub fn signalfd(fd: Option<Fd>, signals: &[i32], flags: &[SfdFlag]) -> Result<Fd> {
    let _ = (fd, signals, flags);
    require("signalfd")?;
    Err(SysError::not_available("signalfd"))
}

/// Read one delivered signal record from a signal descriptor
///
/// The kernel writes whole records; a short read means the descriptor is
/// not a signalfd and reports as EINVAL.
#[cfg(target_os = "linux")]
pub fn signalfd_read(fd: Fd) -> Result<SignalfdSiginfo> {
    require("signalfd")?;
    let mut si: libc::signalfd_siginfo = unsafe { std::mem::zeroed() };
    let want = std::mem::size_of::<libc::signalfd_siginfo>();
    let (n, errno) = blocking_call(|| unsafe {
        libc::read(fd, &mut si as *mut libc::signalfd_siginfo as *mut libc::c_void, want)
    });
    if n == -1 {
        return Err(SysError::os("signalfd_read", errno));
    }
    if n as usize != want {
        return Err(SysError::os("signalfd_read", libc::EINVAL));
    }
    Ok(SignalfdSiginfo::decode(&si))
}
