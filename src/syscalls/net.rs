/*!
 * Socket Calls
 * Extended socket options, peer credentials, and fd passing over unix sockets
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::Fd;
use crate::runtime::blocking::blocking_call;
use crate::runtime::capability::require;
use serde::{Deserialize, Serialize};
use std::mem;

#[cfg(target_os = "linux")]
use crate::marshal::Credentials;

/// Extended socket options beyond the portable baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SockOpt {
    TcpKeepCnt,
    TcpKeepIdle,
    TcpKeepIntvl,
    ReusePort,
}

impl SockOpt {
    /// `(level, option)` pair, or `None` where the platform lacks the option
    fn resolve(self) -> Option<(libc::c_int, libc::c_int)> {
        match self {
            Self::TcpKeepCnt => Some((libc::IPPROTO_TCP, libc::TCP_KEEPCNT)),
            #[cfg(target_os = "linux")]
            Self::TcpKeepIdle => Some((libc::IPPROTO_TCP, libc::TCP_KEEPIDLE)),
            #[cfg(not(target_os = "linux"))]
            Self::TcpKeepIdle => None,
            Self::TcpKeepIntvl => Some((libc::IPPROTO_TCP, libc::TCP_KEEPINTVL)),
            Self::ReusePort => Some((libc::SOL_SOCKET, libc::SO_REUSEPORT)),
        }
    }

    fn require(self) -> Result<(libc::c_int, libc::c_int)> {
        self.resolve()
            .ok_or_else(|| SysError::not_available(format!("socket option {self:?}")))
    }
}

/// Whether the platform can express this option at all
#[must_use]
pub fn have_sockopt(opt: SockOpt) -> bool {
    opt.resolve().is_some()
}

/// Read an integer-valued extended socket option
pub fn getsockopt(fd: Fd, opt: SockOpt) -> Result<i32> {
    let (level, name) = opt.require()?;
    let mut value: libc::c_int = 0;
    let mut len = mem::size_of::<libc::c_int>() as libc::socklen_t;
    let (ret, errno) = blocking_call(|| unsafe {
        libc::getsockopt(
            fd,
            level,
            name,
            &mut value as *mut libc::c_int as *mut libc::c_void,
            &mut len,
        )
    });
    if ret == -1 {
        return Err(SysError::os_with("getsockopt", errno, format!("{opt:?}")));
    }
    Ok(value)
}

/// Set an integer-valued extended socket option
pub fn setsockopt(fd: Fd, opt: SockOpt, value: i32) -> Result<()> {
    let (level, name) = opt.require()?;
    let raw: libc::c_int = value;
    let (ret, errno) = blocking_call(|| unsafe {
        libc::setsockopt(
            fd,
            level,
            name,
            &raw as *const libc::c_int as *const libc::c_void,
            mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    });
    if ret == -1 {
        return Err(SysError::os_with("setsockopt", errno, format!("{opt:?}")));
    }
    Ok(())
}

/// Credentials of the peer on a connected unix socket
#[cfg(target_os = "linux")]
pub fn read_credentials(fd: Fd) -> Result<Credentials> {
    require("read_credentials")?;
    let mut uc: libc::ucred = unsafe { mem::zeroed() };
    let mut len = mem::size_of::<libc::ucred>() as libc::socklen_t;
    let (ret, errno) = blocking_call(|| unsafe {
        libc::getsockopt(
            fd,
            libc::SOL_SOCKET,
            libc::SO_PEERCRED,
            &mut uc as *mut libc::ucred as *mut libc::c_void,
            &mut len,
        )
    });
    if ret == -1 {
        return Err(SysError::os("read_credentials", errno));
    }
    Ok(Credentials::decode(&uc))
}

#[cfg(not(target_os = "linux"))]
pub fn read_credentials(fd: Fd) -> Result<crate::marshal::Credentials> {
    let _ = fd;
    require("read_credentials")?;
    Err(SysError::not_available("read_credentials"))
}

/// Control buffer sized and aligned for one fd-bearing control message
#[repr(C)]
union CmsgSpace {
    hdr: libc::cmsghdr,
    space: [u8; 64],
}

/// Send bytes over a unix socket, optionally attaching a descriptor
///
/// The descriptor rides in an `SCM_RIGHTS` control message; the receiver
/// gets a fresh fd number referring to the same open file.
pub fn sendmsg(fd: Fd, data: &[u8], pass_fd: Option<Fd>) -> Result<usize> {
    let mut iov = libc::iovec {
        iov_base: data.as_ptr() as *mut libc::c_void,
        iov_len: data.len(),
    };
    let mut msg: libc::msghdr = unsafe { mem::zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;

    let mut control = CmsgSpace {
        space: [0u8; 64],
    };
    if let Some(pass) = pass_fd {
        msg.msg_control = unsafe { control.space.as_mut_ptr() } as *mut libc::c_void;
        msg.msg_controllen = unsafe { libc::CMSG_SPACE(mem::size_of::<Fd>() as u32) } as _;
        let cmsg = unsafe { libc::CMSG_FIRSTHDR(&msg) };
        unsafe {
            (*cmsg).cmsg_level = libc::SOL_SOCKET;
            (*cmsg).cmsg_type = libc::SCM_RIGHTS;
            (*cmsg).cmsg_len = libc::CMSG_LEN(mem::size_of::<Fd>() as u32) as _;
            std::ptr::write_unaligned(libc::CMSG_DATA(cmsg) as *mut Fd, pass);
        }
    }

    let (n, errno) = blocking_call(|| unsafe { libc::sendmsg(fd, &msg, 0) });
    if n == -1 {
        return Err(SysError::os("sendmsg", errno));
    }
    Ok(n as usize)
}

/// Receive bytes from a unix socket, collecting any passed descriptor
///
/// The control buffer has room for exactly one descriptor. If the sender
/// attached more, or the kernel flags the ancillary data as truncated,
/// every descriptor that did arrive is closed and the call fails; silently
/// keeping some of them would leak the rest into this process.
pub fn recvmsg(fd: Fd, buf: &mut [u8]) -> Result<(usize, Option<Fd>)> {
    let mut iov = libc::iovec {
        iov_base: buf.as_mut_ptr() as *mut libc::c_void,
        iov_len: buf.len(),
    };
    let mut control = CmsgSpace {
        space: [0u8; 64],
    };
    let mut msg: libc::msghdr = unsafe { mem::zeroed() };
    msg.msg_iov = &mut iov;
    msg.msg_iovlen = 1;
    msg.msg_control = unsafe { control.space.as_mut_ptr() } as *mut libc::c_void;
    msg.msg_controllen = unsafe { libc::CMSG_SPACE(mem::size_of::<Fd>() as u32) } as _;

    let (n, errno) = blocking_call(|| unsafe { libc::recvmsg(fd, &mut msg, 0) });
    if n == -1 {
        return Err(SysError::os("recvmsg", errno));
    }

    let mut arrived: Vec<Fd> = Vec::new();
    let mut cmsg = unsafe { libc::CMSG_FIRSTHDR(&msg) };
    while !cmsg.is_null() {
        let (level, kind, cmsg_len) =
            unsafe { ((*cmsg).cmsg_level, (*cmsg).cmsg_type, (*cmsg).cmsg_len) };
        if level == libc::SOL_SOCKET && kind == libc::SCM_RIGHTS {
            let data_len = cmsg_len as usize - unsafe { libc::CMSG_LEN(0) } as usize;
            let data = unsafe { libc::CMSG_DATA(cmsg) };
            for i in 0..data_len / mem::size_of::<Fd>() {
                arrived.push(unsafe {
                    std::ptr::read_unaligned((data as *const Fd).add(i))
                });
            }
        }
        cmsg = unsafe { libc::CMSG_NXTHDR(&msg, cmsg) };
    }

    let truncated = msg.msg_flags & libc::MSG_CTRUNC != 0;
    if truncated || arrived.len() > 1 {
        for passed in arrived {
            unsafe { libc::close(passed) };
        }
        return Err(SysError::overflow(
            "recvmsg control data exceeds the single-descriptor window",
        ));
    }
    Ok((n as usize, arrived.pop()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn socketpair() -> (Fd, Fd) {
        let mut fds = [0; 2];
        let ret =
            unsafe { libc::socketpair(libc::AF_UNIX, libc::SOCK_STREAM, 0, fds.as_mut_ptr()) };
        assert_eq!(ret, 0);
        (fds[0], fds[1])
    }

    #[test]
    fn test_fd_passing_round_trip() {
        let (a, b) = socketpair();
        let mut pipe = [0; 2];
        assert_eq!(unsafe { libc::pipe(pipe.as_mut_ptr()) }, 0);

        sendmsg(a, b"here", Some(pipe[0])).unwrap();
        let mut buf = [0u8; 16];
        let (n, received) = recvmsg(b, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"here");
        let received = received.unwrap();
        // The passed fd is a live descriptor distinct from the original
        assert_ne!(received, pipe[0]);
        assert_eq!(unsafe { libc::write(pipe[1], b"x".as_ptr().cast(), 1) }, 1);
        let mut one = [0u8; 1];
        assert_eq!(
            unsafe { libc::read(received, one.as_mut_ptr().cast(), 1) },
            1
        );
        assert_eq!(&one, b"x");

        for fd in [a, b, pipe[0], pipe[1], received] {
            unsafe { libc::close(fd) };
        }
    }

    #[test]
    fn test_overfull_control_data_is_rejected() {
        let (a, b) = socketpair();

        // Hand-rolled sender attaching three descriptors; the receive
        // window holds one, so the kernel truncates the control data.
        let payload = b"crowded";
        let mut iov = libc::iovec {
            iov_base: payload.as_ptr() as *mut libc::c_void,
            iov_len: payload.len(),
        };
        let mut control = CmsgSpace { space: [0u8; 64] };
        let mut msg: libc::msghdr = unsafe { mem::zeroed() };
        msg.msg_iov = &mut iov;
        msg.msg_iovlen = 1;
        msg.msg_control = unsafe { control.space.as_mut_ptr() } as *mut libc::c_void;
        msg.msg_controllen = unsafe { libc::CMSG_SPACE(3 * mem::size_of::<Fd>() as u32) } as _;
        let trio: [Fd; 3] = [0, 1, 2];
        unsafe {
            let cmsg = libc::CMSG_FIRSTHDR(&msg);
            (*cmsg).cmsg_level = libc::SOL_SOCKET;
            (*cmsg).cmsg_type = libc::SCM_RIGHTS;
            (*cmsg).cmsg_len = libc::CMSG_LEN(3 * mem::size_of::<Fd>() as u32) as _;
            std::ptr::copy_nonoverlapping(
                trio.as_ptr() as *const u8,
                libc::CMSG_DATA(cmsg),
                3 * mem::size_of::<Fd>(),
            );
            assert_eq!(libc::sendmsg(a, &msg, 0), payload.len() as isize);
        }

        let before = descriptor_count();
        let mut buf = [0u8; 16];
        let err = recvmsg(b, &mut buf).unwrap_err();
        assert!(matches!(err, SysError::Overflow(_)));
        // Whatever descriptors the kernel did deliver were closed
        assert_eq!(descriptor_count(), before);

        unsafe {
            libc::close(a);
            libc::close(b);
        }
    }

    #[cfg(target_os = "linux")]
    fn descriptor_count() -> usize {
        std::fs::read_dir("/proc/self/fd").unwrap().count()
    }

    #[cfg(not(target_os = "linux"))]
    fn descriptor_count() -> usize {
        std::fs::read_dir("/dev/fd").unwrap().count()
    }

    #[test]
    fn test_plain_message_carries_no_fd() {
        let (a, b) = socketpair();
        sendmsg(a, b"plain", None).unwrap();
        let mut buf = [0u8; 16];
        let (n, received) = recvmsg(b, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"plain");
        assert!(received.is_none());
        unsafe {
            libc::close(a);
            libc::close(b);
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_peer_credentials_are_self() {
        let (a, b) = socketpair();
        let cred = read_credentials(a).unwrap();
        assert_eq!(cred.pid, std::process::id() as i32);
        unsafe {
            libc::close(a);
            libc::close(b);
        }
    }

    #[test]
    fn test_keepalive_count_round_trip() {
        let fd = unsafe { libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0) };
        assert!(fd >= 0);
        setsockopt(fd, SockOpt::TcpKeepCnt, 5).unwrap();
        assert_eq!(getsockopt(fd, SockOpt::TcpKeepCnt).unwrap(), 5);
        unsafe { libc::close(fd) };
    }
}
