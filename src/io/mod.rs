/*!
 * I/O Module
 * Partial-transfer retry engine
 */

pub mod retry;

pub use retry::{RetryPolicy, CHUNK_SIZE};
