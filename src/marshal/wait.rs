/*!
 * Wait Status Marshaling
 * Exit-status decoding and the resource-usage record from wait4
 */

use serde::{Deserialize, Serialize};

/// Decoded child state change, from the raw wait status word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WaitStatus {
    Exited { code: i32 },
    Signaled { signal: i32, core_dumped: bool },
    Stopped { signal: i32 },
    Continued,
}

impl WaitStatus {
    pub(crate) fn decode(status: i32) -> Self {
        if libc::WIFEXITED(status) {
            Self::Exited {
                code: libc::WEXITSTATUS(status),
            }
        } else if libc::WIFSIGNALED(status) {
            Self::Signaled {
                signal: libc::WTERMSIG(status),
                core_dumped: libc::WCOREDUMP(status),
            }
        } else if libc::WIFSTOPPED(status) {
            Self::Stopped {
                signal: libc::WSTOPSIG(status),
            }
        } else {
            Self::Continued
        }
    }
}

/// Resource usage of a reaped child
///
/// Times are in seconds; the remaining counters keep the kernel's units
/// (kilobytes for `max_rss`, raw counts elsewhere).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rusage {
    pub user_time: f64,
    pub system_time: f64,
    pub max_rss: i64,
    pub minor_faults: i64,
    pub major_faults: i64,
    pub in_block: i64,
    pub out_block: i64,
    pub voluntary_ctxt_switches: i64,
    pub involuntary_ctxt_switches: i64,
}

fn timeval_secs(tv: &libc::timeval) -> f64 {
    tv.tv_sec as f64 + tv.tv_usec as f64 / 1e6
}

impl Rusage {
    pub(crate) fn decode(ru: &libc::rusage) -> Self {
        Self {
            user_time: timeval_secs(&ru.ru_utime),
            system_time: timeval_secs(&ru.ru_stime),
            max_rss: ru.ru_maxrss as i64,
            minor_faults: ru.ru_minflt as i64,
            major_faults: ru.ru_majflt as i64,
            in_block: ru.ru_inblock as i64,
            out_block: ru.ru_oublock as i64,
            voluntary_ctxt_switches: ru.ru_nvcsw as i64,
            involuntary_ctxt_switches: ru.ru_nivcsw as i64,
        }
    }
}
