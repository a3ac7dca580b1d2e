/*!
 * Stat Marshaling
 * Kernel `struct stat` decoded into a plain value record
 */

use crate::core::errors::{Result, SysError};
use serde::{Deserialize, Serialize};

/// File kind extracted from `st_mode & S_IFMT`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Regular,
    Directory,
    CharDevice,
    BlockDevice,
    Symlink,
    Fifo,
    Socket,
}

impl FileKind {
    fn from_mode(mode: u32) -> Self {
        match mode & libc::S_IFMT as u32 {
            m if m == libc::S_IFDIR as u32 => Self::Directory,
            m if m == libc::S_IFCHR as u32 => Self::CharDevice,
            m if m == libc::S_IFBLK as u32 => Self::BlockDevice,
            m if m == libc::S_IFLNK as u32 => Self::Symlink,
            m if m == libc::S_IFIFO as u32 => Self::Fifo,
            m if m == libc::S_IFSOCK as u32 => Self::Socket,
            // Unknown format bits default to a regular file
            _ => Self::Regular,
        }
    }
}

/// Plain value record mirroring `struct stat`
///
/// Field widths match the kernel ABI: 64-bit device/inode/size, unsigned
/// ids, permission bits separated from the format bits. Created only as
/// the direct decode of a syscall's output buffer; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatInfo {
    pub dev: u64,
    pub ino: u64,
    pub kind: FileKind,
    /// Permission bits only (`st_mode & 0o7777`)
    pub perm: u32,
    pub nlink: u64,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u64,
    pub size: i64,
    /// Seconds since the epoch, as the kernel reports them
    pub atime: f64,
    pub mtime: f64,
    pub ctime: f64,
}

impl StatInfo {
    pub(crate) fn decode(op: &'static str, st: &libc::stat) -> Result<Self> {
        let mode = st.st_mode as u32;
        let kind = FileKind::from_mode(mode);
        // Mirrors the historical EOVERFLOW guard for regular-file sizes
        if st.st_size < 0 && kind == FileKind::Regular {
            return Err(SysError::overflow(op));
        }
        Ok(Self {
            dev: st.st_dev as u64,
            ino: st.st_ino as u64,
            kind,
            perm: mode & 0o7777,
            nlink: st.st_nlink as u64,
            uid: st.st_uid as u32,
            gid: st.st_gid as u32,
            rdev: st.st_rdev as u64,
            size: st.st_size as i64,
            atime: st.st_atime as f64,
            mtime: st.st_mtime as f64,
            ctime: st.st_ctime as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn raw_stat(mode: u32) -> libc::stat {
        let mut st: libc::stat = unsafe { std::mem::zeroed() };
        st.st_mode = mode as _;
        st.st_ino = 7;
        st.st_size = 4096;
        st
    }

    #[test]
    fn test_kind_and_perm_split() {
        let st = raw_stat(libc::S_IFDIR as u32 | 0o755);
        let info = StatInfo::decode("fstatat", &st).unwrap();
        assert_eq!(info.kind, FileKind::Directory);
        assert_eq!(info.perm, 0o755);
        assert_eq!(info.size, 4096);
    }

    #[test]
    fn test_decode_is_injective_on_mode() {
        let a = StatInfo::decode("fstatat", &raw_stat(libc::S_IFREG as u32 | 0o644)).unwrap();
        let b = StatInfo::decode("fstatat", &raw_stat(libc::S_IFREG as u32 | 0o600)).unwrap();
        assert_ne!(a, b);
        // Only the mode-derived field differs
        assert_eq!(a.ino, b.ino);
        assert_eq!(a.size, b.size);
        assert_eq!(a.kind, b.kind);
        assert_ne!(a.perm, b.perm);
    }

    #[test]
    fn test_negative_regular_size_overflows() {
        let mut st = raw_stat(libc::S_IFREG as u32);
        st.st_size = -1;
        assert!(matches!(
            StatInfo::decode("fstatat", &st),
            Err(SysError::Overflow(_))
        ));
    }
}
