/*!
 * Time Calls
 * Text/calendar conversions over the C time functions
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::cstr;
use crate::marshal::TmInfo;
use std::ffi::CStr;

/// Parse a timestamp string against a strptime format
///
/// Fields the format does not mention stay zero.
pub fn strptime(input: &str, format: &str) -> Result<TmInfo> {
    let s = cstr(input)?;
    let f = cstr(format)?;
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    let end = unsafe { libc::strptime(s.as_ptr(), f.as_ptr(), &mut tm) };
    if end.is_null() {
        return Err(SysError::invalid_argument(format!(
            "strptime: {input:?} does not match {format:?}"
        )));
    }
    Ok(TmInfo::decode(&tm))
}

/// Render broken-down time through a strftime format
///
/// An empty result is indistinguishable from failure at the C level and
/// reports as EINVAL, so formats that legitimately produce nothing are
/// rejected too.
pub fn strftime(format: &str, tm: &TmInfo) -> Result<String> {
    let f = cstr(format)?;
    let raw = tm.encode();
    let mut buf = [0u8; 256];
    let n = unsafe {
        libc::strftime(
            buf.as_mut_ptr() as *mut libc::c_char,
            buf.len(),
            f.as_ptr(),
            &raw,
        )
    };
    if n == 0 {
        return Err(SysError::os("strftime", libc::EINVAL));
    }
    Ok(String::from_utf8_lossy(&buf[..n]).into_owned())
}

/// Fixed-format rendering, "Day Mon dd hh:mm:ss yyyy\n"
pub fn asctime(tm: &TmInfo) -> Result<String> {
    let raw = tm.encode();
    let mut buf = [0 as libc::c_char; 32];
    let ptr = unsafe { libc::asctime_r(&raw, buf.as_mut_ptr()) };
    if ptr.is_null() {
        return Err(SysError::invalid_argument("asctime: field out of range"));
    }
    Ok(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Inverse of gmtime: broken-down UTC time to epoch seconds
///
/// Never consults the local timezone.
pub fn timegm(tm: &TmInfo) -> i64 {
    let mut raw = tm.encode();
    unsafe { libc::timegm(&mut raw) as i64 }
}

/// Local timezone at a given instant: seconds east of UTC, and whether
/// daylight saving was in effect
pub fn timezone_offset(at: i64) -> Result<(i64, bool)> {
    let t = at as libc::time_t;
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    let ptr = unsafe { libc::localtime_r(&t, &mut tm) };
    if ptr.is_null() {
        return Err(SysError::invalid_argument("timezone_offset: instant out of range"));
    }
    Ok((tm.tm_gmtoff as i64, tm.tm_isdst > 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_then_render_round_trips() {
        let tm = strptime("2026-08-29 13:45:30", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(tm.year, 126);
        assert_eq!(tm.mon, 7);
        assert_eq!(tm.mday, 29);
        let text = strftime("%Y-%m-%d %H:%M:%S", &tm).unwrap();
        assert_eq!(text, "2026-08-29 13:45:30");
    }

    #[test]
    fn test_parse_mismatch_is_rejected() {
        let err = strptime("not a date", "%Y-%m-%d").unwrap_err();
        assert!(matches!(err, SysError::InvalidArgument(_)));
    }

    #[test]
    fn test_timegm_ignores_local_zone() {
        let tm = strptime("1970-01-02 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        assert_eq!(timegm(&tm), 86400);
    }

    #[test]
    fn test_asctime_fixed_format() {
        let tm = strptime("2000-01-01 00:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        let text = asctime(&tm).unwrap();
        assert!(text.contains("2000"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_timezone_offset_is_sane() {
        let (offset, _dst) = timezone_offset(0).unwrap();
        // Real zones stay within a day of UTC
        assert!(offset.abs() < 86400);
    }
}
