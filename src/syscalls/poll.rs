/*!
 * Poll
 * Multiplexed readiness over a descriptor set
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::Fd;
use crate::flags::FlagTable;
use crate::runtime::blocking::blocking_call;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

/// Poll event vocabulary, request and response sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollEvent {
    In,
    Pri,
    Out,
    Err,
    Hup,
    Nval,
    RdHup,
}

fn poll_events() -> &'static FlagTable<PollEvent> {
    static TABLE: OnceLock<FlagTable<PollEvent>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let t = FlagTable::new("poll")
            .with(PollEvent::In, libc::POLLIN as u64)
            .with(PollEvent::Pri, libc::POLLPRI as u64)
            .with(PollEvent::Out, libc::POLLOUT as u64)
            .with(PollEvent::Err, libc::POLLERR as u64)
            .with(PollEvent::Hup, libc::POLLHUP as u64)
            .with(PollEvent::Nval, libc::POLLNVAL as u64);
        #[cfg(target_os = "linux")]
        let t = t.with(PollEvent::RdHup, libc::POLLRDHUP as u64);
        #[cfg(not(target_os = "linux"))]
        let t = t.without(PollEvent::RdHup);
        t
    })
}

/// One descriptor's readiness request
#[derive(Debug, Clone)]
pub struct PollRequest {
    pub fd: Fd,
    pub events: Vec<PollEvent>,
}

/// Wait for readiness on a descriptor set
///
/// `timeout` of `None` blocks indefinitely. Returns only the descriptors
/// with a non-empty response, each with its events decoded in table order.
/// Requested events the platform lacks (e.g. `RdHup` where absent) encode
/// as no bits.
pub fn poll(
    requests: &[PollRequest],
    timeout: Option<Duration>,
) -> Result<Vec<(Fd, Vec<PollEvent>)>> {
    let table = poll_events();
    let mut fds = Vec::with_capacity(requests.len());
    for req in requests {
        fds.push(libc::pollfd {
            fd: req.fd,
            events: table.encode_lenient(&req.events)? as libc::c_short,
            revents: 0,
        });
    }

    let ms = match timeout {
        None => -1,
        Some(d) => libc::c_int::try_from(d.as_millis())
            .map_err(|_| SysError::invalid_argument("poll timeout exceeds c_int milliseconds"))?,
    };

    let nfds = fds.len() as libc::nfds_t;
    let (ret, errno) = blocking_call(|| unsafe { libc::poll(fds.as_mut_ptr(), nfds, ms) });
    if ret == -1 {
        return Err(SysError::os("poll", errno));
    }

    Ok(fds
        .iter()
        .filter(|pfd| pfd.revents != 0)
        .map(|pfd| (pfd.fd, table.decode(pfd.revents as u16 as u64)))
        .collect())
}
