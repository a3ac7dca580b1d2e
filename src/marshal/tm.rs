/*!
 * Broken-Down Time Marshaling
 * `struct tm` as a plain value record, both directions
 */

use serde::{Deserialize, Serialize};

/// Broken-down calendar time
///
/// Field conventions follow `struct tm`: `mon` is 0-11, `year` counts from
/// 1900, `wday` 0-6 from Sunday, `yday` 0-365. The platform-specific
/// extension fields (zone name, UTC offset) are not carried; encoding
/// zeroes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmInfo {
    pub sec: i32,
    pub min: i32,
    pub hour: i32,
    pub mday: i32,
    pub mon: i32,
    pub year: i32,
    pub wday: i32,
    pub yday: i32,
    pub isdst: bool,
}

impl TmInfo {
    pub(crate) fn decode(tm: &libc::tm) -> Self {
        Self {
            sec: tm.tm_sec,
            min: tm.tm_min,
            hour: tm.tm_hour,
            mday: tm.tm_mday,
            mon: tm.tm_mon,
            year: tm.tm_year,
            wday: tm.tm_wday,
            yday: tm.tm_yday,
            isdst: tm.tm_isdst > 0,
        }
    }

    pub(crate) fn encode(&self) -> libc::tm {
        let mut tm: libc::tm = unsafe { std::mem::zeroed() };
        tm.tm_sec = self.sec;
        tm.tm_min = self.min;
        tm.tm_hour = self.hour;
        tm.tm_mday = self.mday;
        tm.tm_mon = self.mon;
        tm.tm_year = self.year;
        tm.tm_wday = self.wday;
        tm.tm_yday = self.yday;
        tm.tm_isdst = if self.isdst { 1 } else { 0 };
        tm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip() {
        let t = TmInfo {
            sec: 30,
            min: 45,
            hour: 13,
            mday: 29,
            mon: 7,
            year: 126,
            wday: 6,
            yday: 240,
            isdst: false,
        };
        assert_eq!(TmInfo::decode(&t.encode()), t);
    }

    #[test]
    fn test_negative_isdst_decodes_false() {
        // "information unavailable" from the C side maps to false
        let mut tm: libc::tm = unsafe { std::mem::zeroed() };
        tm.tm_isdst = -1;
        assert!(!TmInfo::decode(&tm).isdst);
    }
}
