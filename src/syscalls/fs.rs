/*!
 * Filesystem Calls
 * Directory-relative operations, allocation hints, sync, and path utilities
 *
 * Every *at operation takes `dirfd: Option<Fd>`; `None` resolves relative
 * paths against the current working directory. At-flag lists are masked to
 * the bits each operation accepts, so a stray flag cannot leak into an
 * unrelated call.
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::{cpath, Fd, Gid, Uid};
use crate::flags::FlagTable;
use crate::marshal::StatInfo;
use crate::runtime::blocking::blocking_call;
use crate::runtime::capability::require;
use serde::{Deserialize, Serialize};
use std::ffi::CStr;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::trace;

/// Open-flag vocabulary for [`openat`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenFlag {
    RdOnly,
    WrOnly,
    RdWr,
    NonBlock,
    Append,
    Creat,
    Trunc,
    Excl,
    NoCtty,
    Dsync,
    Sync,
    Rsync,
    CloExec,
}

fn open_flags() -> &'static FlagTable<OpenFlag> {
    static TABLE: OnceLock<FlagTable<OpenFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let t = FlagTable::new("open")
            .with(OpenFlag::RdOnly, libc::O_RDONLY as u64)
            .with(OpenFlag::WrOnly, libc::O_WRONLY as u64)
            .with(OpenFlag::RdWr, libc::O_RDWR as u64)
            .with(OpenFlag::NonBlock, libc::O_NONBLOCK as u64)
            .with(OpenFlag::Append, libc::O_APPEND as u64)
            .with(OpenFlag::Creat, libc::O_CREAT as u64)
            .with(OpenFlag::Trunc, libc::O_TRUNC as u64)
            .with(OpenFlag::Excl, libc::O_EXCL as u64)
            .with(OpenFlag::NoCtty, libc::O_NOCTTY as u64)
            .with(OpenFlag::Dsync, libc::O_DSYNC as u64)
            .with(OpenFlag::Sync, libc::O_SYNC as u64);
        #[cfg(target_os = "linux")]
        let t = t.with(OpenFlag::Rsync, libc::O_RSYNC as u64);
        #[cfg(not(target_os = "linux"))]
        let t = t.without(OpenFlag::Rsync);
        t.with(OpenFlag::CloExec, libc::O_CLOEXEC as u64)
    })
}

/// At-flag vocabulary shared by the *at family
///
/// Each operation masks the encoded bits to what it accepts; see the
/// per-operation constants below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtFlag {
    SymlinkNoFollow,
    NoAutomount,
    RemoveDir,
    SymlinkFollow,
}

fn at_flags() -> &'static FlagTable<AtFlag> {
    static TABLE: OnceLock<FlagTable<AtFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let t = FlagTable::new("at")
            .with(AtFlag::SymlinkNoFollow, libc::AT_SYMLINK_NOFOLLOW as u64);
        #[cfg(target_os = "linux")]
        let t = t.with(AtFlag::NoAutomount, libc::AT_NO_AUTOMOUNT as u64);
        #[cfg(not(target_os = "linux"))]
        let t = t.without(AtFlag::NoAutomount);
        t.with(AtFlag::RemoveDir, libc::AT_REMOVEDIR as u64)
            .with(AtFlag::SymlinkFollow, libc::AT_SYMLINK_FOLLOW as u64)
    })
}

/// Flags for [`renameat2`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameFlag {
    NoReplace,
    Exchange,
    Whiteout,
}

fn rename_flags() -> &'static FlagTable<RenameFlag> {
    static TABLE: OnceLock<FlagTable<RenameFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        #[cfg(target_os = "linux")]
        {
            FlagTable::new("rename")
                .with(RenameFlag::NoReplace, libc::RENAME_NOREPLACE as u64)
                .with(RenameFlag::Exchange, libc::RENAME_EXCHANGE as u64)
                .with(RenameFlag::Whiteout, libc::RENAME_WHITEOUT as u64)
        }
        #[cfg(not(target_os = "linux"))]
        {
            FlagTable::new("rename")
                .without(RenameFlag::NoReplace)
                .without(RenameFlag::Exchange)
                .without(RenameFlag::Whiteout)
        }
    })
}

/// Advice hints for [`fadvise`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advice {
    Normal,
    Sequential,
    Random,
    NoReuse,
    WillNeed,
    DontNeed,
}

#[cfg(target_os = "linux")]
impl Advice {
    fn raw(self) -> libc::c_int {
        match self {
            Self::Normal => libc::POSIX_FADV_NORMAL,
            Self::Sequential => libc::POSIX_FADV_SEQUENTIAL,
            Self::Random => libc::POSIX_FADV_RANDOM,
            Self::NoReuse => libc::POSIX_FADV_NOREUSE,
            Self::WillNeed => libc::POSIX_FADV_WILLNEED,
            Self::DontNeed => libc::POSIX_FADV_DONTNEED,
        }
    }
}

#[inline]
fn at_fd(dirfd: Option<Fd>) -> Fd {
    dirfd.unwrap_or(libc::AT_FDCWD)
}

fn check(op: &'static str, ret: libc::c_int, errno: i32, path: &Path) -> Result<()> {
    if ret == -1 {
        Err(SysError::os_with(op, errno, path.to_string_lossy()))
    } else {
        Ok(())
    }
}

/// Open a file relative to `dirfd`
///
/// Unsupported optional flags (e.g. `Rsync` where absent) encode as no
/// bits rather than failing; access-mode flags exist everywhere.
pub fn openat(dirfd: Option<Fd>, path: &Path, flags: &[OpenFlag], mode: u32) -> Result<Fd> {
    let p = cpath(path)?;
    let bits = open_flags().encode_lenient(flags)? as libc::c_int;
    trace!(path = %path.display(), bits, "openat");
    let (fd, errno) = blocking_call(|| unsafe {
        libc::openat(at_fd(dirfd), p.as_ptr(), bits, mode as libc::c_uint)
    });
    if fd == -1 {
        return Err(SysError::os_with("openat", errno, path.to_string_lossy()));
    }
    Ok(fd)
}

/// Stat a file relative to `dirfd`, without following a final symlink if asked
pub fn fstatat(dirfd: Option<Fd>, path: &Path, flags: &[AtFlag]) -> Result<StatInfo> {
    let p = cpath(path)?;
    let mask = libc::AT_SYMLINK_NOFOLLOW as u64 | at_flags().bits(AtFlag::NoAutomount).unwrap_or(0);
    let bits = (at_flags().encode_lenient(flags)? & mask) as libc::c_int;
    let mut st: libc::stat = unsafe { std::mem::zeroed() };
    let (ret, errno) =
        blocking_call(|| unsafe { libc::fstatat(at_fd(dirfd), p.as_ptr(), &mut st, bits) });
    check("fstatat", ret, errno, path)?;
    StatInfo::decode("fstatat", &st)
}

/// Unlink a file or (with `RemoveDir`) remove an empty directory
pub fn unlinkat(dirfd: Option<Fd>, path: &Path, flags: &[AtFlag]) -> Result<()> {
    let p = cpath(path)?;
    let bits = (at_flags().encode_lenient(flags)? & libc::AT_REMOVEDIR as u64) as libc::c_int;
    let (ret, errno) = blocking_call(|| unsafe { libc::unlinkat(at_fd(dirfd), p.as_ptr(), bits) });
    check("unlinkat", ret, errno, path)
}

pub fn mkdirat(dirfd: Option<Fd>, path: &Path, mode: u32) -> Result<()> {
    let p = cpath(path)?;
    let (ret, errno) = blocking_call(|| unsafe {
        libc::mkdirat(at_fd(dirfd), p.as_ptr(), mode as libc::mode_t)
    });
    check("mkdirat", ret, errno, path)
}

pub fn renameat(
    old_dirfd: Option<Fd>,
    old_path: &Path,
    new_dirfd: Option<Fd>,
    new_path: &Path,
) -> Result<()> {
    let old = cpath(old_path)?;
    let new = cpath(new_path)?;
    let (ret, errno) = blocking_call(|| unsafe {
        libc::renameat(at_fd(old_dirfd), old.as_ptr(), at_fd(new_dirfd), new.as_ptr())
    });
    check("renameat", ret, errno, old_path)
}

/// Rename with atomicity flags; strict about flag support
///
/// A requested flag the platform cannot express fails with `NotAvailable`
/// before the syscall: exchange must not degrade to a plain rename.
pub fn renameat2(
    old_dirfd: Option<Fd>,
    old_path: &Path,
    new_dirfd: Option<Fd>,
    new_path: &Path,
    flags: &[RenameFlag],
) -> Result<()> {
    require("renameat2")?;
    let bits = rename_flags().encode(flags)?;
    #[cfg(target_os = "linux")]
    {
        let old = cpath(old_path)?;
        let new = cpath(new_path)?;
        let (ret, errno) = blocking_call(|| unsafe {
            libc::renameat2(
                at_fd(old_dirfd),
                old.as_ptr(),
                at_fd(new_dirfd),
                new.as_ptr(),
                bits as libc::c_uint,
            )
        });
        check("renameat2", ret, errno, old_path)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (old_dirfd, old_path, new_dirfd, new_path, bits);
        Err(SysError::not_available("renameat2"))
    }
}

/// Hard-link, following a final symlink in the source only when asked
pub fn linkat(
    old_dirfd: Option<Fd>,
    old_path: &Path,
    new_dirfd: Option<Fd>,
    new_path: &Path,
    flags: &[AtFlag],
) -> Result<()> {
    let old = cpath(old_path)?;
    let new = cpath(new_path)?;
    let bits = (at_flags().encode_lenient(flags)? & libc::AT_SYMLINK_FOLLOW as u64) as libc::c_int;
    let (ret, errno) = blocking_call(|| unsafe {
        libc::linkat(
            at_fd(old_dirfd),
            old.as_ptr(),
            at_fd(new_dirfd),
            new.as_ptr(),
            bits,
        )
    });
    check("linkat", ret, errno, old_path)
}

pub fn symlinkat(target: &Path, new_dirfd: Option<Fd>, link_path: &Path) -> Result<()> {
    let t = cpath(target)?;
    let l = cpath(link_path)?;
    let (ret, errno) =
        blocking_call(|| unsafe { libc::symlinkat(t.as_ptr(), at_fd(new_dirfd), l.as_ptr()) });
    check("symlinkat", ret, errno, link_path)
}

/// Read a symlink target, growing the buffer until it fits
pub fn readlinkat(dirfd: Option<Fd>, path: &Path) -> Result<PathBuf> {
    let p = cpath(path)?;
    let mut buf = vec![0u8; 100];
    loop {
        let (n, errno) = blocking_call(|| unsafe {
            libc::readlinkat(
                at_fd(dirfd),
                p.as_ptr(),
                buf.as_mut_ptr() as *mut libc::c_char,
                buf.len(),
            )
        });
        if n == -1 {
            return Err(SysError::os_with("readlinkat", errno, path.to_string_lossy()));
        }
        let n = n as usize;
        if n < buf.len() {
            buf.truncate(n);
            return Ok(PathBuf::from(String::from_utf8_lossy(&buf).into_owned()));
        }
        // Full buffer may mean truncation; retry larger
        buf.resize(buf.len() * 2, 0);
    }
}

pub fn fchownat(
    dirfd: Option<Fd>,
    path: &Path,
    uid: Uid,
    gid: Gid,
    flags: &[AtFlag],
) -> Result<()> {
    let p = cpath(path)?;
    let bits =
        (at_flags().encode_lenient(flags)? & libc::AT_SYMLINK_NOFOLLOW as u64) as libc::c_int;
    let (ret, errno) =
        blocking_call(|| unsafe { libc::fchownat(at_fd(dirfd), p.as_ptr(), uid, gid, bits) });
    check("fchownat", ret, errno, path)
}

pub fn fchmodat(dirfd: Option<Fd>, path: &Path, mode: u32, flags: &[AtFlag]) -> Result<()> {
    let p = cpath(path)?;
    let bits =
        (at_flags().encode_lenient(flags)? & libc::AT_SYMLINK_NOFOLLOW as u64) as libc::c_int;
    let (ret, errno) = blocking_call(|| unsafe {
        libc::fchmodat(at_fd(dirfd), p.as_ptr(), mode as libc::mode_t, bits)
    });
    check("fchmodat", ret, errno, path)
}

/// Guarantee disk space for a file region
///
/// The underlying call reports failure through its return value, not errno.
pub fn fallocate(fd: Fd, offset: u64, len: u64) -> Result<()> {
    require("fallocate")?;
    #[cfg(target_os = "linux")]
    {
        let (err, _) = blocking_call(|| unsafe {
            libc::posix_fallocate(fd, offset as libc::off_t, len as libc::off_t)
        });
        if err != 0 {
            return Err(SysError::os("fallocate", err));
        }
        Ok(())
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (fd, offset, len);
        Err(SysError::not_available("fallocate"))
    }
}

/// Declare an access pattern for a file region
pub fn fadvise(fd: Fd, offset: u64, len: u64, advice: Advice) -> Result<()> {
    require("fadvise")?;
    #[cfg(target_os = "linux")]
    {
        let (err, _) = blocking_call(|| unsafe {
            libc::posix_fadvise(fd, offset as libc::off_t, len as libc::off_t, advice.raw())
        });
        if err != 0 {
            return Err(SysError::os("fadvise", err));
        }
        Ok(())
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (fd, offset, len, advice);
        Err(SysError::not_available("fadvise"))
    }
}

pub fn fsync(fd: Fd) -> Result<()> {
    let (ret, errno) = blocking_call(|| unsafe { libc::fsync(fd) });
    if ret == -1 {
        return Err(SysError::os("fsync", errno));
    }
    Ok(())
}

/// Flush file data, skipping metadata where the platform allows
pub fn fdatasync(fd: Fd) -> Result<()> {
    #[cfg(target_os = "linux")]
    let (ret, errno) = blocking_call(|| unsafe { libc::fdatasync(fd) });
    // Falls back to a full fsync where fdatasync is absent
    #[cfg(not(target_os = "linux"))]
    let (ret, errno) = blocking_call(|| unsafe { libc::fsync(fd) });
    if ret == -1 {
        return Err(SysError::os("fdatasync", errno));
    }
    Ok(())
}

/// Whether `fd` names an open descriptor
///
/// `EBADF` is the negative answer, not an error; anything else propagates.
pub fn is_open_descr(fd: Fd) -> Result<bool> {
    let (ret, errno) = blocking_call(|| unsafe { libc::fcntl(fd, libc::F_GETFL) });
    if ret == -1 {
        if errno == libc::EBADF {
            return Ok(false);
        }
        return Err(SysError::os("is_open_descr", errno));
    }
    Ok(true)
}

/// Canonicalize a path through the C allocator
pub fn realpath(path: &Path) -> Result<PathBuf> {
    let p = cpath(path)?;
    let (ptr, errno) =
        blocking_call(|| unsafe { libc::realpath(p.as_ptr(), std::ptr::null_mut()) });
    if ptr.is_null() {
        return Err(SysError::os_with("realpath", errno, path.to_string_lossy()));
    }
    let resolved = unsafe { CStr::from_ptr(ptr) }
        .to_string_lossy()
        .into_owned();
    unsafe { libc::free(ptr as *mut libc::c_void) };
    Ok(PathBuf::from(resolved))
}

/// Create a unique directory from a template ending in `XXXXXX`
///
/// Returns the directory path with the placeholder filled in.
pub fn mkdtemp(template: &str) -> Result<PathBuf> {
    let mut buf = crate::core::types::cstr(template)?.into_bytes_with_nul();
    let (ptr, errno) =
        blocking_call(|| unsafe { libc::mkdtemp(buf.as_mut_ptr() as *mut libc::c_char) });
    if ptr.is_null() {
        return Err(SysError::os_with("mkdtemp", errno, template));
    }
    let made = String::from_utf8_lossy(&buf[..buf.len() - 1]).into_owned();
    Ok(PathBuf::from(made))
}

/// Create and open a unique file; the template's `XXXXXX` sits `suffix_len`
/// bytes before the end
pub fn mkstemps(template: &str, suffix_len: usize) -> Result<(Fd, PathBuf)> {
    let suffix = libc::c_int::try_from(suffix_len)
        .map_err(|_| SysError::invalid_argument("mkstemps suffix length"))?;
    let mut buf = crate::core::types::cstr(template)?.into_bytes_with_nul();
    let (fd, errno) = blocking_call(|| unsafe {
        libc::mkstemps(buf.as_mut_ptr() as *mut libc::c_char, suffix)
    });
    if fd == -1 {
        return Err(SysError::os_with("mkstemps", errno, template));
    }
    let made = String::from_utf8_lossy(&buf[..buf.len() - 1]).into_owned();
    Ok((fd, PathBuf::from(made)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_open_flag_access_modes_everywhere() {
        let t = open_flags();
        assert!(t.is_supported(OpenFlag::RdOnly));
        assert!(t.is_supported(OpenFlag::CloExec));
        assert_eq!(t.bits(OpenFlag::RdOnly), Some(libc::O_RDONLY as u64));
    }

    #[test]
    fn test_at_flag_masking_strips_foreign_bits() {
        // A RemoveDir flag handed to a chown-style mask encodes to zero
        let bits = at_flags()
            .encode_lenient(&[AtFlag::RemoveDir])
            .unwrap()
            & libc::AT_SYMLINK_NOFOLLOW as u64;
        assert_eq!(bits, 0);
    }

    #[test]
    fn test_is_open_descr_distinguishes() {
        assert!(!is_open_descr(-1).unwrap());
        assert!(is_open_descr(0).unwrap());
    }

    #[cfg(not(target_os = "linux"))]
    #[test]
    fn test_rename_flags_fail_closed() {
        let err = rename_flags().encode(&[RenameFlag::Exchange]).unwrap_err();
        assert!(err.is_not_available());
    }
}
