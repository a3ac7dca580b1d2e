/*!
 * Marshal Module
 * Kernel struct decoding into plain value records
 *
 * Records here are created only as the direct decode of a syscall's output
 * buffer, with the exact ABI field widths, and never mutated afterwards.
 */

pub mod cred;
pub mod rlimit;
pub mod siginfo;
pub mod stat;
pub mod statvfs;
pub mod sysinfo;
pub mod tm;
pub mod wait;

pub use cred::Credentials;
pub use rlimit::{Limit, ResourceKind, RlimitPair};
#[cfg(target_os = "linux")]
pub use siginfo::SignalfdSiginfo;
pub use stat::{FileKind, StatInfo};
pub use statvfs::{mount_state_flags, MountStateFlag, StatvfsInfo};
pub use sysinfo::SysinfoInfo;
pub use tm::TmInfo;
pub use wait::{Rusage, WaitStatus};
