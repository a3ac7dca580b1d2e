/*!
 * Process Calls
 * Process groups, sessions, identity, priority, child reaping, and tracing
 */

use crate::core::errors::{clear_errno, last_errno, Result, SysError};
use crate::core::types::{cstr, Fd, Gid, Pid, Uid};
use crate::flags::FlagTable;
use crate::marshal::{Rusage, WaitStatus};
use crate::runtime::blocking::{blocking_call, direct_call};
use crate::runtime::capability::require;
use serde::{Deserialize, Serialize};
#[cfg(target_os = "linux")]
use std::ffi::CString;
use std::sync::OnceLock;

fn check(op: &'static str, ret: libc::c_int, errno: i32) -> Result<()> {
    if ret == -1 {
        Err(SysError::os(op, errno))
    } else {
        Ok(())
    }
}

pub fn getpgid(pid: Pid) -> Result<Pid> {
    let (pgid, errno) = direct_call(|| unsafe { libc::getpgid(pid) });
    if pgid == -1 {
        return Err(SysError::os("getpgid", errno));
    }
    Ok(pgid)
}

pub fn setpgid(pid: Pid, pgid: Pid) -> Result<()> {
    let (ret, errno) = direct_call(|| unsafe { libc::setpgid(pid, pgid) });
    check("setpgid", ret, errno)
}

pub fn getsid(pid: Pid) -> Result<Pid> {
    let (sid, errno) = direct_call(|| unsafe { libc::getsid(pid) });
    if sid == -1 {
        return Err(SysError::os("getsid", errno));
    }
    Ok(sid)
}

pub fn setsid() -> Result<Pid> {
    let (sid, errno) = direct_call(|| unsafe { libc::setsid() });
    if sid == -1 {
        return Err(SysError::os("setsid", errno));
    }
    Ok(sid)
}

pub fn setreuid(ruid: Uid, euid: Uid) -> Result<()> {
    let (ret, errno) = direct_call(|| unsafe { libc::setreuid(ruid, euid) });
    check("setreuid", ret, errno)
}

pub fn setregid(rgid: Gid, egid: Gid) -> Result<()> {
    let (ret, errno) = direct_call(|| unsafe { libc::setregid(rgid, egid) });
    check("setregid", ret, errno)
}

/// Set real, effective and saved user ids in one step
pub fn setresuid(ruid: Uid, euid: Uid, suid: Uid) -> Result<()> {
    require("setresuid")?;
    #[cfg(target_os = "linux")]
    {
        let (ret, errno) = direct_call(|| unsafe { libc::setresuid(ruid, euid, suid) });
        check("setresuid", ret, errno)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (ruid, euid, suid);
        Err(SysError::not_available("setresuid"))
    }
}

pub fn setresgid(rgid: Gid, egid: Gid, sgid: Gid) -> Result<()> {
    require("setresgid")?;
    #[cfg(target_os = "linux")]
    {
        let (ret, errno) = direct_call(|| unsafe { libc::setresgid(rgid, egid, sgid) });
        check("setresgid", ret, errno)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (rgid, egid, sgid);
        Err(SysError::not_available("setresgid"))
    }
}

/// Target selector for the priority calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Which {
    Process(Pid),
    Pgrp(Pid),
    User(Uid),
}

impl Which {
    fn split(self) -> (libc::c_int, libc::id_t) {
        match self {
            Self::Process(pid) => (libc::PRIO_PROCESS as libc::c_int, pid as libc::id_t),
            Self::Pgrp(pgid) => (libc::PRIO_PGRP as libc::c_int, pgid as libc::id_t),
            Self::User(uid) => (libc::PRIO_USER as libc::c_int, uid as libc::id_t),
        }
    }
}

/// Nice value of a process, group, or user
///
/// -1 is a legitimate nice value, so failure is detected by the
/// clear-errno protocol: reset errno first, then treat -1 as an error only
/// when errno changed.
pub fn getpriority(which: Which) -> Result<i32> {
    let (w, id) = which.split();
    clear_errno();
    let prio = unsafe { libc::getpriority(w as _, id) };
    if prio == -1 {
        let errno = last_errno();
        if errno != 0 {
            return Err(SysError::os("getpriority", errno));
        }
    }
    Ok(prio)
}

pub fn setpriority(which: Which, prio: i32) -> Result<()> {
    let (w, id) = which.split();
    let (ret, errno) = direct_call(|| unsafe { libc::setpriority(w as _, id, prio) });
    check("setpriority", ret, errno)
}

/// Wait options for [`wait4`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitFlag {
    NoHang,
    Untraced,
    Continued,
}

fn wait_flags() -> &'static FlagTable<WaitFlag> {
    static TABLE: OnceLock<FlagTable<WaitFlag>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("wait")
            .with(WaitFlag::NoHang, libc::WNOHANG as u64)
            .with(WaitFlag::Untraced, libc::WUNTRACED as u64)
            .with(WaitFlag::Continued, libc::WCONTINUED as u64)
    })
}

/// Reap a child, returning its status and resource usage
///
/// With `NoHang`, `Ok(None)` means no child has changed state yet.
pub fn wait4(pid: Pid, flags: &[WaitFlag]) -> Result<Option<(Pid, WaitStatus, Rusage)>> {
    let bits = wait_flags().encode(flags)? as libc::c_int;
    let mut status: libc::c_int = 0;
    let mut ru: libc::rusage = unsafe { std::mem::zeroed() };
    let (child, errno) =
        blocking_call(|| unsafe { libc::wait4(pid, &mut status, bits, &mut ru) });
    if child == -1 {
        return Err(SysError::os("wait4", errno));
    }
    if child == 0 {
        return Ok(None);
    }
    Ok(Some((child, WaitStatus::decode(status), Rusage::decode(&ru))))
}

/// Tracing requests that take no data argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceRequest {
    TraceMe,
    Attach,
    Detach,
}

#[cfg(target_os = "linux")]
impl TraceRequest {
    fn raw(self) -> libc::c_uint {
        match self {
            Self::TraceMe => libc::PTRACE_TRACEME,
            Self::Attach => libc::PTRACE_ATTACH,
            Self::Detach => libc::PTRACE_DETACH,
        }
    }
}

/// Issue a data-less tracing request against `pid`
///
/// `TraceMe` ignores `pid`.
pub fn ptrace(pid: Pid, request: TraceRequest) -> Result<()> {
    require("ptrace")?;
    #[cfg(target_os = "linux")]
    {
        let (ret, errno) = direct_call(|| unsafe {
            libc::ptrace(
                request.raw(),
                pid,
                std::ptr::null_mut::<libc::c_void>(),
                std::ptr::null_mut::<libc::c_void>(),
            )
        });
        if ret == -1 {
            return Err(SysError::os("ptrace", errno));
        }
        Ok(())
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (pid, request);
        Err(SysError::not_available("ptrace"))
    }
}

#[cfg(target_os = "linux")]
fn ptrace_peek(op: &'static str, request: libc::c_uint, pid: Pid, addr: u64) -> Result<i64> {
    clear_errno();
    let word = unsafe {
        libc::ptrace(
            request,
            pid,
            addr as *mut libc::c_void,
            std::ptr::null_mut::<libc::c_void>(),
        )
    };
    if word == -1 {
        let errno = last_errno();
        if errno != 0 {
            return Err(SysError::os(op, errno));
        }
    }
    Ok(word as i64)
}

/// Read one word from the tracee's data space
///
/// A -1 word is a legitimate value, so the clear-errno protocol applies.
pub fn ptrace_peekdata(pid: Pid, addr: u64) -> Result<i64> {
    require("ptrace")?;
    #[cfg(target_os = "linux")]
    {
        ptrace_peek("ptrace_peekdata", libc::PTRACE_PEEKDATA, pid, addr)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (pid, addr);
        Err(SysError::not_available("ptrace_peekdata"))
    }
}

/// Read one word from the tracee's text space
pub fn ptrace_peektext(pid: Pid, addr: u64) -> Result<i64> {
    require("ptrace")?;
    #[cfg(target_os = "linux")]
    {
        ptrace_peek("ptrace_peektext", libc::PTRACE_PEEKTEXT, pid, addr)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (pid, addr);
        Err(SysError::not_available("ptrace_peektext"))
    }
}

/// Execute the program open at `fd`, replacing the current image
///
/// Returns only on failure.
pub fn fexecve(fd: Fd, args: &[&str], env: &[&str]) -> Result<()> {
    require("fexecve")?;
    #[cfg(target_os = "linux")]
    {
        let args: Vec<CString> = args.iter().map(|a| cstr(a)).collect::<Result<_>>()?;
        let env: Vec<CString> = env.iter().map(|e| cstr(e)).collect::<Result<_>>()?;
        let mut argv: Vec<*const libc::c_char> = args.iter().map(|a| a.as_ptr()).collect();
        argv.push(std::ptr::null());
        let mut envp: Vec<*const libc::c_char> = env.iter().map(|e| e.as_ptr()).collect();
        envp.push(std::ptr::null());
        let (_, errno) = direct_call(|| unsafe { libc::fexecve(fd, argv.as_ptr(), envp.as_ptr()) });
        // fexecve does not return on success
        Err(SysError::os("fexecve", errno))
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = (fd, args, env);
        Err(SysError::not_available("fexecve"))
    }
}
