/*!
 * Statvfs Marshaling
 * Filesystem statistics record and the mount-state flag vocabulary
 */

use crate::flags::FlagTable;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Mount-state flag vocabulary for `f_flag`
///
/// The kernel-internal state bits (`Write`, `Append`, `Immutable`) have no
/// exported constant anywhere this builds, so they sit in the table as
/// permanent sentinels. They stay in the vocabulary because callers may
/// still name them when probing support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountStateFlag {
    ReadOnly,
    NoSuid,
    NoDev,
    NoExec,
    Synchronous,
    MandLock,
    Write,
    Append,
    Immutable,
    NoAtime,
    NoDirAtime,
    RelAtime,
}

#[cfg(target_os = "linux")]
fn build_mount_state_table() -> FlagTable<MountStateFlag> {
    FlagTable::new("mount_state")
        .with(MountStateFlag::ReadOnly, libc::ST_RDONLY as u64)
        .with(MountStateFlag::NoSuid, libc::ST_NOSUID as u64)
        .with(MountStateFlag::NoDev, libc::ST_NODEV as u64)
        .with(MountStateFlag::NoExec, libc::ST_NOEXEC as u64)
        .with(MountStateFlag::Synchronous, libc::ST_SYNCHRONOUS as u64)
        .with(MountStateFlag::MandLock, libc::ST_MANDLOCK as u64)
        .without(MountStateFlag::Write)
        .without(MountStateFlag::Append)
        .without(MountStateFlag::Immutable)
        .with(MountStateFlag::NoAtime, libc::ST_NOATIME as u64)
        .with(MountStateFlag::NoDirAtime, libc::ST_NODIRATIME as u64)
        .with(MountStateFlag::RelAtime, libc::ST_RELATIME as u64)
}

#[cfg(not(target_os = "linux"))]
fn build_mount_state_table() -> FlagTable<MountStateFlag> {
    FlagTable::new("mount_state")
        .with(MountStateFlag::ReadOnly, libc::ST_RDONLY as u64)
        .with(MountStateFlag::NoSuid, libc::ST_NOSUID as u64)
        .without(MountStateFlag::NoDev)
        .without(MountStateFlag::NoExec)
        .without(MountStateFlag::Synchronous)
        .without(MountStateFlag::MandLock)
        .without(MountStateFlag::Write)
        .without(MountStateFlag::Append)
        .without(MountStateFlag::Immutable)
        .without(MountStateFlag::NoAtime)
        .without(MountStateFlag::NoDirAtime)
        .without(MountStateFlag::RelAtime)
}

/// Mount-state table, resolved once per process
pub fn mount_state_flags() -> &'static FlagTable<MountStateFlag> {
    static TABLE: OnceLock<FlagTable<MountStateFlag>> = OnceLock::new();
    TABLE.get_or_init(build_mount_state_table)
}

/// Plain value record mirroring `struct statvfs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatvfsInfo {
    /// Preferred I/O block size
    pub bsize: u64,
    /// Fundamental block size (units for the block counts below)
    pub frsize: u64,
    pub blocks: u64,
    pub bfree: u64,
    pub bavail: u64,
    pub files: u64,
    pub ffree: u64,
    pub favail: u64,
    pub fsid: u64,
    /// Mount-state bits decoded through [`mount_state_flags`], table order
    pub flags: Vec<MountStateFlag>,
    pub namemax: u64,
}

impl StatvfsInfo {
    pub(crate) fn decode(sv: &libc::statvfs) -> Self {
        Self {
            bsize: sv.f_bsize as u64,
            frsize: sv.f_frsize as u64,
            blocks: sv.f_blocks as u64,
            bfree: sv.f_bfree as u64,
            bavail: sv.f_bavail as u64,
            files: sv.f_files as u64,
            ffree: sv.f_ffree as u64,
            favail: sv.f_favail as u64,
            fsid: sv.f_fsid as u64,
            flags: mount_state_flags().decode(sv.f_flag as u64),
            namemax: sv.f_namemax as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_state_bits_kernel_internal_are_sentinels() {
        let t = mount_state_flags();
        assert!(!t.is_supported(MountStateFlag::Write));
        assert!(!t.is_supported(MountStateFlag::Append));
        assert!(!t.is_supported(MountStateFlag::Immutable));
        assert!(t.is_supported(MountStateFlag::ReadOnly));
    }

    #[test]
    fn test_decode_reports_table_order() {
        let t = mount_state_flags();
        let mask = libc::ST_NOSUID as u64 | libc::ST_RDONLY as u64;
        assert_eq!(
            t.decode(mask),
            vec![MountStateFlag::ReadOnly, MountStateFlag::NoSuid]
        );
    }

    #[test]
    fn test_record_decode_preserves_counts() {
        let mut sv: libc::statvfs = unsafe { std::mem::zeroed() };
        sv.f_bsize = 4096 as _;
        sv.f_blocks = 1000 as _;
        sv.f_bfree = 250 as _;
        let info = StatvfsInfo::decode(&sv);
        assert_eq!(info.bsize, 4096);
        assert_eq!(info.blocks, 1000);
        assert_eq!(info.bfree, 250);
        assert!(info.flags.is_empty());
    }
}
