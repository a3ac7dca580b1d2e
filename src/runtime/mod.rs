/*!
 * Runtime Module
 * Host-runtime boundary: blocking sections and platform capabilities
 */

pub mod blocking;
pub mod capability;

pub use blocking::{install_hooks, RuntimeHooks};
pub use capability::{capabilities, CapabilityTable};
