/*!
 * Syscall Surface
 * Flat dispatch over the call families
 *
 * Each submodule wraps one family of native calls behind typed arguments:
 * flag lists instead of raw bitmasks, value records instead of output
 * structs, and errors that carry the operation name and errno.
 */

pub mod eventfd;
pub mod fs;
pub mod io;
pub mod ioctl;
pub mod net;
pub mod ns;
pub mod poll;
pub mod process;
pub mod pts;
pub mod resource;
pub mod signalfd;
pub mod splice;
pub mod syslog;
pub mod system;
pub mod time;

pub use eventfd::{eventfd, eventfd_read, eventfd_write, EfdFlag};
pub use fs::{Advice, AtFlag, OpenFlag, RenameFlag};
pub use ioctl::WinSize;
pub use net::SockOpt;
pub use ns::{MountFlag, UmountFlag, UnshareFlag};
pub use poll::{poll, PollEvent, PollRequest};
pub use process::{TraceRequest, WaitFlag, Which};
pub use pts::PtFlag;
pub use signalfd::{signalfd, signalfd_read, SfdFlag};
pub use splice::{splice, tee, SpliceFlag};
pub use syslog::{Facility, LogLevel, LogOption, Syslog};
pub use system::{MlockFlag, SysconfName, UtsName};
