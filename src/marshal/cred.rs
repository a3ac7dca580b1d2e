/*!
 * Peer Credential Marshaling
 */

use serde::{Deserialize, Serialize};

/// Credentials of the process at the other end of a unix socket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub pid: i32,
    pub uid: u32,
    pub gid: u32,
}

#[cfg(target_os = "linux")]
impl Credentials {
    pub(crate) fn decode(uc: &libc::ucred) -> Self {
        Self {
            pid: uc.pid,
            uid: uc.uid,
            gid: uc.gid,
        }
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_maps_fields() {
        let uc = libc::ucred {
            pid: 42,
            uid: 1000,
            gid: 100,
        };
        let c = Credentials::decode(&uc);
        assert_eq!((c.pid, c.uid, c.gid), (42, 1000, 100));
    }
}
