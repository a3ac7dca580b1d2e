//! End-to-end exercise of the directory-relative filesystem surface

use posix_bridge::core::types::Fd;
use posix_bridge::io::RetryPolicy;
use posix_bridge::marshal::FileKind;
use posix_bridge::syscalls::fs::{
    self, is_open_descr, mkdtemp, mkstemps, realpath, AtFlag, OpenFlag,
};
use posix_bridge::syscalls::io;
use std::path::Path;

fn open_dir(path: &Path) -> Fd {
    let dirfd = fs::openat(None, path, &[OpenFlag::RdOnly], 0).unwrap();
    assert!(dirfd >= 0);
    dirfd
}

fn close(fd: Fd) {
    unsafe { libc::close(fd) };
}

#[test]
fn test_file_lifecycle_relative_to_directory() {
    let dir = tempfile::tempdir().unwrap();
    let dirfd = open_dir(dir.path());

    // Create and fill a file addressed relative to dirfd
    let fd = fs::openat(
        Some(dirfd),
        Path::new("data.bin"),
        &[OpenFlag::RdWr, OpenFlag::Creat, OpenFlag::Excl, OpenFlag::CloExec],
        0o600,
    )
    .unwrap();
    assert_eq!(io::write(fd, b"0123456789", RetryPolicy::ALL).unwrap(), 10);
    fs::fsync(fd).unwrap();

    let st = fs::fstatat(Some(dirfd), Path::new("data.bin"), &[]).unwrap();
    assert_eq!(st.kind, FileKind::Regular);
    assert_eq!(st.size, 10);
    assert_eq!(st.perm, 0o600);

    // Exclusive create must refuse a second time
    let err = fs::openat(
        Some(dirfd),
        Path::new("data.bin"),
        &[OpenFlag::WrOnly, OpenFlag::Creat, OpenFlag::Excl],
        0o600,
    )
    .unwrap_err();
    assert_eq!(err.errno(), Some(libc::EEXIST));

    // Rename within the directory, then hard-link and count
    fs::renameat(
        Some(dirfd),
        Path::new("data.bin"),
        Some(dirfd),
        Path::new("renamed.bin"),
    )
    .unwrap();
    fs::linkat(
        Some(dirfd),
        Path::new("renamed.bin"),
        Some(dirfd),
        Path::new("second-name.bin"),
        &[],
    )
    .unwrap();
    let st = fs::fstatat(Some(dirfd), Path::new("renamed.bin"), &[]).unwrap();
    assert_eq!(st.nlink, 2);

    fs::unlinkat(Some(dirfd), Path::new("second-name.bin"), &[]).unwrap();
    fs::unlinkat(Some(dirfd), Path::new("renamed.bin"), &[]).unwrap();
    close(fd);
    close(dirfd);
}

#[test]
fn test_symlink_stat_follows_and_not() {
    let dir = tempfile::tempdir().unwrap();
    let dirfd = open_dir(dir.path());

    let fd = fs::openat(
        Some(dirfd),
        Path::new("target"),
        &[OpenFlag::WrOnly, OpenFlag::Creat],
        0o644,
    )
    .unwrap();
    close(fd);
    fs::symlinkat(Path::new("target"), Some(dirfd), Path::new("alias")).unwrap();

    let followed = fs::fstatat(Some(dirfd), Path::new("alias"), &[]).unwrap();
    assert_eq!(followed.kind, FileKind::Regular);
    let link_itself = fs::fstatat(
        Some(dirfd),
        Path::new("alias"),
        &[AtFlag::SymlinkNoFollow],
    )
    .unwrap();
    assert_eq!(link_itself.kind, FileKind::Symlink);

    assert_eq!(
        fs::readlinkat(Some(dirfd), Path::new("alias")).unwrap(),
        Path::new("target")
    );
    close(dirfd);
}

#[test]
fn test_directory_lifecycle_requires_removedir() {
    let dir = tempfile::tempdir().unwrap();
    let dirfd = open_dir(dir.path());

    fs::mkdirat(Some(dirfd), Path::new("sub"), 0o755).unwrap();
    let st = fs::fstatat(Some(dirfd), Path::new("sub"), &[]).unwrap();
    assert_eq!(st.kind, FileKind::Directory);

    // Plain unlink refuses a directory
    let err = fs::unlinkat(Some(dirfd), Path::new("sub"), &[]).unwrap_err();
    assert!(matches!(err.errno(), Some(libc::EISDIR) | Some(libc::EPERM)));
    fs::unlinkat(Some(dirfd), Path::new("sub"), &[AtFlag::RemoveDir]).unwrap();
    close(dirfd);
}

#[cfg(target_os = "linux")]
#[test]
fn test_renameat2_exchange_swaps_contents() {
    use posix_bridge::syscalls::fs::RenameFlag;

    let dir = tempfile::tempdir().unwrap();
    let dirfd = open_dir(dir.path());
    for (name, content) in [("a", b"alpha" as &[u8]), ("b", b"beta")] {
        let fd = fs::openat(
            Some(dirfd),
            Path::new(name),
            &[OpenFlag::WrOnly, OpenFlag::Creat],
            0o644,
        )
        .unwrap();
        io::write(fd, content, RetryPolicy::ALL).unwrap();
        close(fd);
    }

    fs::renameat2(
        Some(dirfd),
        Path::new("a"),
        Some(dirfd),
        Path::new("b"),
        &[RenameFlag::Exchange],
    )
    .unwrap();

    let fd = fs::openat(Some(dirfd), Path::new("b"), &[OpenFlag::RdOnly], 0).unwrap();
    let mut buf = [0u8; 5];
    io::read(fd, &mut buf, RetryPolicy::ALL).unwrap();
    assert_eq!(&buf, b"alpha");
    close(fd);
    close(dirfd);
}

#[test]
fn test_noreplace_refuses_existing_target() {
    use posix_bridge::syscalls::fs::RenameFlag;

    let dir = tempfile::tempdir().unwrap();
    let dirfd = open_dir(dir.path());
    for name in ["a", "b"] {
        let fd = fs::openat(
            Some(dirfd),
            Path::new(name),
            &[OpenFlag::WrOnly, OpenFlag::Creat],
            0o644,
        )
        .unwrap();
        close(fd);
    }

    let err = fs::renameat2(
        Some(dirfd),
        Path::new("a"),
        Some(dirfd),
        Path::new("b"),
        &[RenameFlag::NoReplace],
    )
    .unwrap_err();
    // EEXIST where the kernel supports the flag; NotAvailable elsewhere
    assert!(err.errno() == Some(libc::EEXIST) || err.is_not_available());
    close(dirfd);
}

#[test]
fn test_descriptor_probe_and_realpath() {
    let dir = tempfile::tempdir().unwrap();
    let dirfd = open_dir(dir.path());
    assert!(is_open_descr(dirfd).unwrap());
    close(dirfd);
    assert!(!is_open_descr(dirfd).unwrap());

    let resolved = realpath(dir.path()).unwrap();
    assert!(resolved.is_absolute());
}

#[cfg(target_os = "linux")]
#[test]
fn test_fallocate_extends_to_requested_size() {
    let dir = tempfile::tempdir().unwrap();
    let (fd, path) =
        mkstemps(&format!("{}/alloc-XXXXXX.bin", dir.path().display()), 4).unwrap();

    fs::fallocate(fd, 0, 4096).unwrap();
    let st = fs::fstatat(None, &path, &[]).unwrap();
    assert_eq!(st.size, 4096);
    unsafe { libc::close(fd) };
}

#[test]
fn test_template_based_creation() {
    let base = tempfile::tempdir().unwrap();

    let made = mkdtemp(&format!("{}/work-XXXXXX", base.path().display())).unwrap();
    assert!(made.is_dir());
    assert!(!made.to_string_lossy().contains("XXXXXX"));

    let (fd, file) =
        mkstemps(&format!("{}/log-XXXXXX.txt", base.path().display()), 4).unwrap();
    assert!(file.is_file());
    assert!(file.to_string_lossy().ends_with(".txt"));
    assert!(is_open_descr(fd).unwrap());
    unsafe { libc::close(fd) };
}
