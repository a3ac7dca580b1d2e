/*!
 * Mount and Namespace Calls
 * mount, umount2, and namespace unsharing
 */

use crate::core::errors::{Result, SysError};
use crate::runtime::capability::require;
use serde::{Deserialize, Serialize};

#[cfg(target_os = "linux")]
use crate::core::types::cpath;
#[cfg(target_os = "linux")]
use crate::flags::FlagTable;
#[cfg(target_os = "linux")]
use crate::runtime::blocking::blocking_call;
#[cfg(target_os = "linux")]
use std::sync::OnceLock;

use std::path::Path;

/// Mount-request flag vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountFlag {
    ReadOnly,
    NoSuid,
    NoDev,
    NoExec,
    Synchronous,
    Remount,
    MandLock,
    DirSync,
    NoAtime,
    NoDirAtime,
    Bind,
    Move,
    Rec,
    Silent,
    PosixAcl,
    Unbindable,
    Private,
    Slave,
    Shared,
    RelAtime,
    StrictAtime,
}

#[cfg(target_os = "linux")]
fn mount_flags() -> &'static FlagTable<MountFlag> {
    static TABLE: OnceLock<FlagTable<MountFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("mount")
            .with(MountFlag::ReadOnly, libc::MS_RDONLY as u64)
            .with(MountFlag::NoSuid, libc::MS_NOSUID as u64)
            .with(MountFlag::NoDev, libc::MS_NODEV as u64)
            .with(MountFlag::NoExec, libc::MS_NOEXEC as u64)
            .with(MountFlag::Synchronous, libc::MS_SYNCHRONOUS as u64)
            .with(MountFlag::Remount, libc::MS_REMOUNT as u64)
            .with(MountFlag::MandLock, libc::MS_MANDLOCK as u64)
            .with(MountFlag::DirSync, libc::MS_DIRSYNC as u64)
            .with(MountFlag::NoAtime, libc::MS_NOATIME as u64)
            .with(MountFlag::NoDirAtime, libc::MS_NODIRATIME as u64)
            .with(MountFlag::Bind, libc::MS_BIND as u64)
            .with(MountFlag::Move, libc::MS_MOVE as u64)
            .with(MountFlag::Rec, libc::MS_REC as u64)
            .with(MountFlag::Silent, libc::MS_SILENT as u64)
            .with(MountFlag::PosixAcl, libc::MS_POSIXACL as u64)
            .with(MountFlag::Unbindable, libc::MS_UNBINDABLE as u64)
            .with(MountFlag::Private, libc::MS_PRIVATE as u64)
            .with(MountFlag::Slave, libc::MS_SLAVE as u64)
            .with(MountFlag::Shared, libc::MS_SHARED as u64)
            .with(MountFlag::RelAtime, libc::MS_RELATIME as u64)
            .with(MountFlag::StrictAtime, libc::MS_STRICTATIME as u64)
    })
}

/// Detach options for [`umount2`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UmountFlag {
    Force,
    Detach,
    Expire,
    NoFollow,
}

#[cfg(target_os = "linux")]
fn umount_flags() -> &'static FlagTable<UmountFlag> {
    static TABLE: OnceLock<FlagTable<UmountFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("umount2")
            .with(UmountFlag::Force, libc::MNT_FORCE as u64)
            .with(UmountFlag::Detach, libc::MNT_DETACH as u64)
            .with(UmountFlag::Expire, libc::MNT_EXPIRE as u64)
            .with(UmountFlag::NoFollow, libc::UMOUNT_NOFOLLOW as u64)
    })
}

/// Execution-context pieces detachable with [`unshare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnshareFlag {
    Fs,
    Files,
    NewNs,
    SysvSem,
    NewUts,
    NewIpc,
    NewUser,
    NewPid,
    NewNet,
}

#[cfg(target_os = "linux")]
fn unshare_flags() -> &'static FlagTable<UnshareFlag> {
    static TABLE: OnceLock<FlagTable<UnshareFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("unshare")
            .with(UnshareFlag::Fs, libc::CLONE_FS as u64)
            .with(UnshareFlag::Files, libc::CLONE_FILES as u64)
            .with(UnshareFlag::NewNs, libc::CLONE_NEWNS as u64)
            .with(UnshareFlag::SysvSem, libc::CLONE_SYSVSEM as u64)
            .with(UnshareFlag::NewUts, libc::CLONE_NEWUTS as u64)
            .with(UnshareFlag::NewIpc, libc::CLONE_NEWIPC as u64)
            .with(UnshareFlag::NewUser, libc::CLONE_NEWUSER as u64)
            .with(UnshareFlag::NewPid, libc::CLONE_NEWPID as u64)
            .with(UnshareFlag::NewNet, libc::CLONE_NEWNET as u64)
    })
}

/// Mount a filesystem
///
/// `source` and `fstype` semantics depend on the flags, as the kernel
/// defines them (e.g. `Bind` ignores `fstype`).
pub fn mount(
    source: &Path,
    target: &Path,
    fstype: &str,
    flags: &[MountFlag],
    data: Option<&str>,
) -> Result<()> {
    require("mount")?;
    #[cfg(target_os = "linux")]
    {
        let src = cpath(source)?;
        let tgt = cpath(target)?;
        let fst = crate::core::types::cstr(fstype)?;
        let dat = data.map(crate::core::types::cstr).transpose()?;
        let bits = mount_flags().encode(flags)? as libc::c_ulong;
        let (ret, errno) = blocking_call(|| unsafe {
            libc::mount(
                src.as_ptr(),
                tgt.as_ptr(),
                fst.as_ptr(),
                bits,
                dat.as_ref()
                    .map_or(std::ptr::null(), |d| d.as_ptr() as *const libc::c_void),
            )
        });
        if ret == -1 {
            return Err(SysError::os_with("mount", errno, target.to_string_lossy()));
        }
        Ok(())
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (source, target, fstype, flags, data);
        Err(SysError::not_available("mount"))
    }
}

/// Unmount a filesystem, with detach semantics controlled by flags
pub fn umount2(target: &Path, flags: &[UmountFlag]) -> Result<()> {
    require("umount2")?;
    #[cfg(target_os = "linux")]
    {
        let tgt = cpath(target)?;
        let bits = umount_flags().encode(flags)? as libc::c_int;
        let (ret, errno) = blocking_call(|| unsafe { libc::umount2(tgt.as_ptr(), bits) });
        if ret == -1 {
            return Err(SysError::os_with("umount2", errno, target.to_string_lossy()));
        }
        Ok(())
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (target, flags);
        Err(SysError::not_available("umount2"))
    }
}

/// Detach pieces of the caller's execution context
pub fn unshare(flags: &[UnshareFlag]) -> Result<()> {
    require("unshare")?;
    #[cfg(target_os = "linux")]
    {
        let bits = unshare_flags().encode(flags)? as libc::c_int;
        let (ret, errno) = blocking_call(|| unsafe { libc::unshare(bits) });
        if ret == -1 {
            return Err(SysError::os("unshare", errno));
        }
        Ok(())
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = flags;
        Err(SysError::not_available("unshare"))
    }
}
