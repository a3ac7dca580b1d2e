/*!
 * POSIX Bridge
 * Typed access to POSIX and Linux syscalls beyond the portable baseline
 *
 * Three conventions hold everywhere:
 * - Flag lists and value records cross the boundary, never raw bitmasks
 *   or kernel structs.
 * - Platform gaps surface as a distinct not-available error before any
 *   syscall is attempted; nothing silently degrades.
 * - Calls that may block bracket themselves with the embedder's runtime
 *   hooks, capturing errno in between.
 */

pub mod core;
pub mod endian;
pub mod flags;
pub mod io;
pub mod marshal;
pub mod runtime;
pub mod syscalls;

pub use crate::core::{InlineString, Result, SysError};
pub use flags::FlagTable;
pub use io::RetryPolicy;
pub use runtime::{capabilities, install_hooks, RuntimeHooks};
