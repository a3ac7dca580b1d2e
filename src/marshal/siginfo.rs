/*!
 * Signalfd Siginfo Marshaling
 * Fixed-width decode of the signalfd wire record
 */

#![cfg(target_os = "linux")]

use serde::{Deserialize, Serialize};

/// Decoded `signalfd_siginfo` record
///
/// Field widths are the wire widths; which fields are meaningful depends
/// on `code` and `signo`, exactly as the kernel documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalfdSiginfo {
    pub signo: u32,
    pub errno: i32,
    pub code: i32,
    pub pid: u32,
    pub uid: u32,
    pub fd: i32,
    pub tid: u32,
    pub band: u32,
    pub overrun: u32,
    pub trapno: u32,
    pub status: i32,
    pub int: i32,
    pub ptr: u64,
    pub utime: u64,
    pub stime: u64,
    pub addr: u64,
}

impl SignalfdSiginfo {
    pub(crate) fn decode(si: &libc::signalfd_siginfo) -> Self {
        Self {
            signo: si.ssi_signo,
            errno: si.ssi_errno,
            code: si.ssi_code,
            pid: si.ssi_pid,
            uid: si.ssi_uid,
            fd: si.ssi_fd,
            tid: si.ssi_tid,
            band: si.ssi_band,
            overrun: si.ssi_overrun,
            trapno: si.ssi_trapno,
            status: si.ssi_status,
            int: si.ssi_int,
            ptr: si.ssi_ptr,
            utime: si.ssi_utime,
            stime: si.ssi_stime,
            addr: si.ssi_addr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_carries_signal_identity() {
        let mut si: libc::signalfd_siginfo = unsafe { std::mem::zeroed() };
        si.ssi_signo = libc::SIGUSR1 as u32;
        si.ssi_pid = 1234;
        si.ssi_uid = 1000;
        let info = SignalfdSiginfo::decode(&si);
        assert_eq!(info.signo, libc::SIGUSR1 as u32);
        assert_eq!(info.pid, 1234);
        assert_eq!(info.uid, 1000);
    }
}
