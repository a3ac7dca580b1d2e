/*!
 * Resource Limits
 */

use crate::core::errors::{Result, SysError};
use crate::marshal::{ResourceKind, RlimitPair};
use crate::runtime::blocking::direct_call;

/// Soft and hard limits for a resource of the calling process
pub fn getrlimit(kind: ResourceKind) -> Result<RlimitPair> {
    let mut rl = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    let (ret, errno) = direct_call(|| unsafe { libc::getrlimit(kind.raw() as _, &mut rl) });
    if ret == -1 {
        return Err(SysError::os_with("getrlimit", errno, format!("{kind:?}")));
    }
    Ok(RlimitPair::decode(&rl))
}

/// Replace both limits for a resource
///
/// Raising the hard limit needs privilege; the kernel enforces that, not us.
pub fn setrlimit(kind: ResourceKind, limits: RlimitPair) -> Result<()> {
    let rl = limits.encode();
    let (ret, errno) = direct_call(|| unsafe { libc::setrlimit(kind.raw() as _, &rl) });
    if ret == -1 {
        return Err(SysError::os_with("setrlimit", errno, format!("{kind:?}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marshal::Limit;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    #[serial(rlimit)]
    fn test_lower_soft_limit_round_trips() {
        let before = getrlimit(ResourceKind::CoreSize).unwrap();
        let lowered = RlimitPair {
            soft: Limit::Value(0),
            hard: before.hard,
        };
        setrlimit(ResourceKind::CoreSize, lowered).unwrap();
        assert_eq!(getrlimit(ResourceKind::CoreSize).unwrap(), lowered);
        setrlimit(ResourceKind::CoreSize, before).unwrap();
    }

    #[test]
    #[serial(rlimit)]
    fn test_open_files_limit_is_bounded() {
        let pair = getrlimit(ResourceKind::OpenFiles).unwrap();
        // Kernels always cap descriptor counts
        assert_ne!(pair.hard, Limit::Unbounded);
    }
}
