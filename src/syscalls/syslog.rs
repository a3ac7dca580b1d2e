/*!
 * Syslog
 * Handle-based access to the C syslog connection
 *
 * The C library keeps one global connection and retains the ident pointer
 * passed to openlog, so the handle owns the ident allocation for its whole
 * lifetime and every call serializes on one process-wide lock. Opening a
 * second handle re-points the global connection, exactly as the C library
 * behaves.
 */

use crate::core::errors::Result;
use crate::core::types::cstr;
use crate::flags::FlagTable;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::ffi::CString;
use std::sync::OnceLock;

static SYSLOG_LOCK: Mutex<()> = Mutex::new(());

/// Connection options for [`Syslog::open`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOption {
    Pid,
    Cons,
    NoDelay,
    ODelay,
    NoWait,
}

fn log_options() -> &'static FlagTable<LogOption> {
    static TABLE: OnceLock<FlagTable<LogOption>> = OnceLock::new();
    TABLE.get_or_init(|| {
        FlagTable::new("syslog_option")
            .with(LogOption::Pid, libc::LOG_PID as u64)
            .with(LogOption::Cons, libc::LOG_CONS as u64)
            .with(LogOption::NoDelay, libc::LOG_NDELAY as u64)
            .with(LogOption::ODelay, libc::LOG_ODELAY as u64)
            .with(LogOption::NoWait, libc::LOG_NOWAIT as u64)
    })
}

/// Message source facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facility {
    Auth,
    AuthPriv,
    Cron,
    Daemon,
    Ftp,
    Kern,
    Local0,
    Local1,
    Local2,
    Local3,
    Local4,
    Local5,
    Local6,
    Local7,
    Lpr,
    Mail,
    News,
    Syslog,
    User,
    Uucp,
}

impl Facility {
    fn raw(self) -> libc::c_int {
        match self {
            Self::Auth => libc::LOG_AUTH,
            Self::AuthPriv => libc::LOG_AUTHPRIV,
            Self::Cron => libc::LOG_CRON,
            Self::Daemon => libc::LOG_DAEMON,
            Self::Ftp => libc::LOG_FTP,
            Self::Kern => libc::LOG_KERN,
            Self::Local0 => libc::LOG_LOCAL0,
            Self::Local1 => libc::LOG_LOCAL1,
            Self::Local2 => libc::LOG_LOCAL2,
            Self::Local3 => libc::LOG_LOCAL3,
            Self::Local4 => libc::LOG_LOCAL4,
            Self::Local5 => libc::LOG_LOCAL5,
            Self::Local6 => libc::LOG_LOCAL6,
            Self::Local7 => libc::LOG_LOCAL7,
            Self::Lpr => libc::LOG_LPR,
            Self::Mail => libc::LOG_MAIL,
            Self::News => libc::LOG_NEWS,
            Self::Syslog => libc::LOG_SYSLOG,
            Self::User => libc::LOG_USER,
            Self::Uucp => libc::LOG_UUCP,
        }
    }
}

/// Message severity, most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Emerg,
    Alert,
    Crit,
    Err,
    Warning,
    Notice,
    Info,
    Debug,
}

impl LogLevel {
    fn raw(self) -> libc::c_int {
        match self {
            Self::Emerg => libc::LOG_EMERG,
            Self::Alert => libc::LOG_ALERT,
            Self::Crit => libc::LOG_CRIT,
            Self::Err => libc::LOG_ERR,
            Self::Warning => libc::LOG_WARNING,
            Self::Notice => libc::LOG_NOTICE,
            Self::Info => libc::LOG_INFO,
            Self::Debug => libc::LOG_DEBUG,
        }
    }
}

fn level_mask() -> &'static FlagTable<LogLevel> {
    static TABLE: OnceLock<FlagTable<LogLevel>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let levels = [
            LogLevel::Emerg,
            LogLevel::Alert,
            LogLevel::Crit,
            LogLevel::Err,
            LogLevel::Warning,
            LogLevel::Notice,
            LogLevel::Info,
            LogLevel::Debug,
        ];
        let mut t = FlagTable::new("syslog_mask");
        for level in levels {
            t = t.with(level, (1u64) << level.raw());
        }
        t
    })
}

/// Open syslog connection
///
/// Keeps its ident string alive until dropped; dropping closes the
/// connection.
#[derive(Debug)]
pub struct Syslog {
    // Held, not read: the C library retains this pointer until closelog
    _ident: CString,
}

impl Syslog {
    /// Connect to the logger under `ident`
    pub fn open(ident: &str, options: &[LogOption], facility: Facility) -> Result<Self> {
        let ident = cstr(ident)?;
        let bits = log_options().encode(options)? as libc::c_int;
        let _guard = SYSLOG_LOCK.lock();
        unsafe { libc::openlog(ident.as_ptr(), bits, facility.raw()) };
        Ok(Self { _ident: ident })
    }

    /// Submit one message at the given severity
    pub fn log(&self, level: LogLevel, message: &str) -> Result<()> {
        let msg = cstr(message)?;
        let _guard = SYSLOG_LOCK.lock();
        // %s keeps user-controlled bytes out of the format string
        unsafe { libc::syslog(level.raw(), b"%s\0".as_ptr().cast(), msg.as_ptr()) };
        Ok(())
    }

    /// Replace the severity mask; returns the previously accepted levels
    pub fn set_mask(&self, levels: &[LogLevel]) -> Result<Vec<LogLevel>> {
        let mask = level_mask().encode(levels)? as libc::c_int;
        let _guard = SYSLOG_LOCK.lock();
        let previous = unsafe { libc::setlogmask(mask) };
        Ok(level_mask().decode(previous as u64))
    }

    /// Currently accepted levels, without changing the mask
    pub fn mask(&self) -> Vec<LogLevel> {
        let _guard = SYSLOG_LOCK.lock();
        let current = unsafe { libc::setlogmask(0) };
        level_mask().decode(current as u64)
    }
}

impl Drop for Syslog {
    fn drop(&mut self) {
        let _guard = SYSLOG_LOCK.lock();
        unsafe { libc::closelog() };
    }
}
