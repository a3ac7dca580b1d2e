/*!
 * Capability Table
 * Platform support resolved once at process start
 *
 * Replaces scattered per-call-site conditional compilation: every
 * platform-dependent operation is listed here with its availability, and
 * call sites query the table uniformly. An unavailable operation raises
 * feature-not-available before any syscall is attempted.
 */

use crate::core::errors::{Result, SysError};
use std::sync::OnceLock;

const LINUX: bool = cfg!(target_os = "linux");

/// Operation → supported mapping, fixed for the life of the process
#[derive(Debug)]
pub struct CapabilityTable {
    entries: Vec<(&'static str, bool)>,
}

impl CapabilityTable {
    fn resolve() -> Self {
        let entries = vec![
            ("renameat2", LINUX),
            ("fallocate", LINUX),
            ("fadvise", LINUX),
            ("signalfd", LINUX),
            ("eventfd", LINUX),
            ("sysinfo", LINUX),
            ("uptime", LINUX),
            ("mount", LINUX),
            ("umount2", LINUX),
            ("unshare", LINUX),
            ("ptrace", LINUX),
            ("splice", LINUX),
            ("tee", LINUX),
            ("read_credentials", LINUX),
            ("fexecve", LINUX),
            ("setresuid", LINUX),
            ("setresgid", LINUX),
        ];
        Self { entries }
    }

    /// Whether the named operation can be issued on this platform
    pub fn supports(&self, op: &str) -> bool {
        self.entries
            .iter()
            .any(|&(name, supported)| name == op && supported)
    }

    /// Operations known to the table, in declaration order
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.entries.iter().copied()
    }
}

/// The process-wide capability table
pub fn capabilities() -> &'static CapabilityTable {
    static TABLE: OnceLock<CapabilityTable> = OnceLock::new();
    TABLE.get_or_init(|| {
        let table = CapabilityTable::resolve();
        let missing = table.entries.iter().filter(|&&(_, s)| !s).count();
        log::debug!(
            "capability table resolved: {} operations, {} unavailable here",
            table.entries.len(),
            missing
        );
        table
    })
}

/// Gate an operation, raising feature-not-available without any syscall
#[inline]
pub(crate) fn require(op: &'static str) -> Result<()> {
    if capabilities().supports(op) {
        Ok(())
    } else {
        Err(SysError::not_available(op))
    }
}
