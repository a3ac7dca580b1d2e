/*!
 * System-Wide Queries
 * Kernel identity, configuration values, memory locking, and fs statistics
 */

use crate::core::errors::{clear_errno, last_errno, Result, SysError};
use crate::core::types::{cpath, Fd};
use crate::flags::FlagTable;
use crate::marshal::StatvfsInfo;
use crate::runtime::blocking::blocking_call;
use crate::runtime::capability::require;
use serde::{Deserialize, Serialize};
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[cfg(target_os = "linux")]
use crate::marshal::SysinfoInfo;

/// Kernel identity, from `uname`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtsName {
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
}

fn field_to_string(field: &[libc::c_char]) -> String {
    unsafe { CStr::from_ptr(field.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

/// Identify the running kernel
pub fn uname() -> Result<UtsName> {
    let mut uts: libc::utsname = unsafe { std::mem::zeroed() };
    let (ret, errno) = blocking_call(|| unsafe { libc::uname(&mut uts) });
    if ret == -1 {
        return Err(SysError::os("uname", errno));
    }
    Ok(UtsName {
        sysname: field_to_string(&uts.sysname),
        nodename: field_to_string(&uts.nodename),
        release: field_to_string(&uts.release),
        version: field_to_string(&uts.version),
        machine: field_to_string(&uts.machine),
    })
}

/// Queryable configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SysconfName {
    PageSize,
    ClockTick,
    OpenMax,
    ProcessorsConfigured,
    ProcessorsOnline,
    PhysPages,
    HostNameMax,
    LoginNameMax,
}

impl SysconfName {
    fn raw(self) -> libc::c_int {
        match self {
            Self::PageSize => libc::_SC_PAGESIZE,
            Self::ClockTick => libc::_SC_CLK_TCK,
            Self::OpenMax => libc::_SC_OPEN_MAX,
            Self::ProcessorsConfigured => libc::_SC_NPROCESSORS_CONF,
            Self::ProcessorsOnline => libc::_SC_NPROCESSORS_ONLN,
            Self::PhysPages => libc::_SC_PHYS_PAGES,
            Self::HostNameMax => libc::_SC_HOST_NAME_MAX,
            Self::LoginNameMax => libc::_SC_LOGIN_NAME_MAX,
        }
    }
}

/// Configuration value, or `None` where the system imposes no limit
///
/// -1 without an errno change means "indeterminate", so the clear-errno
/// protocol applies.
pub fn sysconf(name: SysconfName) -> Result<Option<i64>> {
    clear_errno();
    let value = unsafe { libc::sysconf(name.raw()) };
    if value == -1 {
        let errno = last_errno();
        if errno != 0 {
            return Err(SysError::os_with("sysconf", errno, format!("{name:?}")));
        }
        return Ok(None);
    }
    Ok(Some(value as i64))
}

/// System-wide statistics snapshot
#[cfg(target_os = "linux")]
pub fn sysinfo() -> Result<SysinfoInfo> {
    require("sysinfo")?;
    let mut si: libc::sysinfo = unsafe { std::mem::zeroed() };
    let (ret, errno) = blocking_call(|| unsafe { libc::sysinfo(&mut si) });
    if ret == -1 {
        return Err(SysError::os("sysinfo", errno));
    }
    Ok(SysinfoInfo::decode(&si))
}

#[cfg(not(target_os = "linux"))]
pub fn sysinfo() -> Result<crate::marshal::SysinfoInfo> {
    require("sysinfo")?;
    Err(SysError::not_available("sysinfo"))
}

/// Seconds since boot
pub fn uptime() -> Result<i64> {
    require("uptime")?;
    #[cfg(target_os = "linux")]
    {
        Ok(sysinfo()?.uptime)
    }
    #[cfg(not(target_os = "linux"))]
    {
        Err(SysError::not_available("uptime"))
    }
}

/// Statistics of the filesystem holding `path`
pub fn statvfs(path: &Path) -> Result<StatvfsInfo> {
    let p = cpath(path)?;
    let mut sv: libc::statvfs = unsafe { std::mem::zeroed() };
    let (ret, errno) = blocking_call(|| unsafe { libc::statvfs(p.as_ptr(), &mut sv) });
    if ret == -1 {
        return Err(SysError::os_with("statvfs", errno, path.to_string_lossy()));
    }
    Ok(StatvfsInfo::decode(&sv))
}

/// Statistics of the filesystem holding the open descriptor
pub fn fstatvfs(fd: Fd) -> Result<StatvfsInfo> {
    let mut sv: libc::statvfs = unsafe { std::mem::zeroed() };
    let (ret, errno) = blocking_call(|| unsafe { libc::fstatvfs(fd, &mut sv) });
    if ret == -1 {
        return Err(SysError::os("fstatvfs", errno));
    }
    Ok(StatvfsInfo::decode(&sv))
}

/// Terminal device behind a descriptor
pub fn ttyname(fd: Fd) -> Result<PathBuf> {
    let mut buf = [0 as libc::c_char; 256];
    let (err, _) =
        blocking_call(|| unsafe { libc::ttyname_r(fd, buf.as_mut_ptr(), buf.len()) });
    if err != 0 {
        return Err(SysError::os("ttyname", err));
    }
    let name = unsafe { CStr::from_ptr(buf.as_ptr()) }
        .to_string_lossy()
        .into_owned();
    Ok(PathBuf::from(name))
}

/// Scope selector for [`mlockall`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MlockFlag {
    Current,
    Future,
}

fn mlock_flags() -> &'static FlagTable<MlockFlag> {
    static TABLE: OnceLock<FlagTable<MlockFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("mlockall")
            .with(MlockFlag::Current, libc::MCL_CURRENT as u64)
            .with(MlockFlag::Future, libc::MCL_FUTURE as u64)
    })
}

/// Pin the process address space into RAM
pub fn mlockall(flags: &[MlockFlag]) -> Result<()> {
    let bits = mlock_flags().encode(flags)? as libc::c_int;
    let (ret, errno) = blocking_call(|| unsafe { libc::mlockall(bits) });
    if ret == -1 {
        return Err(SysError::os("mlockall", errno));
    }
    Ok(())
}

pub fn munlockall() -> Result<()> {
    let (ret, errno) = blocking_call(|| unsafe { libc::munlockall() });
    if ret == -1 {
        return Err(SysError::os("munlockall", errno));
    }
    Ok(())
}
