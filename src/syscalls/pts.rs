/*!
 * Pseudo-Terminal Calls
 * Master-side allocation and slave naming
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::Fd;
use crate::flags::FlagTable;
use crate::runtime::blocking::blocking_call;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::ffi::CStr;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Open flags accepted by [`openpt`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PtFlag {
    RdWr,
    NoCtty,
}

fn pt_flags() -> &'static FlagTable<PtFlag> {
    static TABLE: OnceLock<FlagTable<PtFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("openpt")
            .with(PtFlag::RdWr, libc::O_RDWR as u64)
            .with(PtFlag::NoCtty, libc::O_NOCTTY as u64)
    })
}

/// Open a pseudo-terminal master
pub fn openpt(flags: &[PtFlag]) -> Result<Fd> {
    let bits = pt_flags().encode(flags)? as libc::c_int;
    let (fd, errno) = blocking_call(|| unsafe { libc::posix_openpt(bits) });
    if fd == -1 {
        return Err(SysError::os("posix_openpt", errno));
    }
    Ok(fd)
}

/// Grant slave-side access to the terminal behind the master
pub fn grantpt(fd: Fd) -> Result<()> {
    let (ret, errno) = blocking_call(|| unsafe { libc::grantpt(fd) });
    if ret == -1 {
        return Err(SysError::os("grantpt", errno));
    }
    Ok(())
}

/// Unlock the slave side of the terminal behind the master
pub fn unlockpt(fd: Fd) -> Result<()> {
    let (ret, errno) = blocking_call(|| unsafe { libc::unlockpt(fd) });
    if ret == -1 {
        return Err(SysError::os("unlockpt", errno));
    }
    Ok(())
}

// ptsname writes into C-static storage; serialize access and copy out
// before releasing the lock.
static PTSNAME_LOCK: Mutex<()> = Mutex::new(());

/// Path of the slave terminal behind a master descriptor
pub fn ptsname(fd: Fd) -> Result<PathBuf> {
    let _guard = PTSNAME_LOCK.lock();
    let (ptr, errno) = blocking_call(|| unsafe { libc::ptsname(fd) });
    if ptr.is_null() {
        return Err(SysError::os("ptsname", errno));
    }
    let name = unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned();
    Ok(PathBuf::from(name))
}
