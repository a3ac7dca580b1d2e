/*!
 * Core Module
 * Errors, common types, and logging setup
 */

pub mod errors;
pub mod inline_string;
pub mod logging;
pub mod types;

pub use errors::{Result, SysError};
pub use inline_string::InlineString;
pub use logging::{init_logging, init_tracing};
pub use types::{Fd, Gid, Pid, Uid};
