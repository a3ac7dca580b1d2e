/*!
 * Terminal Ioctls
 * Window-size queries against a terminal descriptor
 */

use crate::core::errors::{Result, SysError};
use crate::core::types::Fd;
use crate::runtime::blocking::blocking_call;
use serde::{Deserialize, Serialize};

/// Terminal window dimensions
///
/// Pixel fields are zero on terminals that do not report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinSize {
    pub rows: u16,
    pub cols: u16,
    pub xpixel: u16,
    pub ypixel: u16,
}

/// Current window size of the terminal behind `fd`
pub fn get_winsize(fd: Fd) -> Result<WinSize> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let (ret, errno) = blocking_call(|| unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut ws) });
    if ret == -1 {
        return Err(SysError::os("get_winsize", errno));
    }
    Ok(WinSize {
        rows: ws.ws_row,
        cols: ws.ws_col,
        xpixel: ws.ws_xpixel,
        ypixel: ws.ws_ypixel,
    })
}

/// Resize the terminal behind `fd`, signalling its foreground group
pub fn set_winsize(fd: Fd, size: WinSize) -> Result<()> {
    let ws = libc::winsize {
        ws_row: size.rows,
        ws_col: size.cols,
        ws_xpixel: size.xpixel,
        ws_ypixel: size.ypixel,
    };
    let (ret, errno) = blocking_call(|| unsafe { libc::ioctl(fd, libc::TIOCSWINSZ, &ws) });
    if ret == -1 {
        return Err(SysError::os("set_winsize", errno));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syscalls::pts::{grantpt, openpt, unlockpt, PtFlag};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_winsize_round_trip_on_pty() {
        let master = openpt(&[PtFlag::RdWr, PtFlag::NoCtty]).unwrap();
        grantpt(master).unwrap();
        unlockpt(master).unwrap();

        let size = WinSize {
            rows: 48,
            cols: 132,
            xpixel: 0,
            ypixel: 0,
        };
        set_winsize(master, size).unwrap();
        assert_eq!(get_winsize(master).unwrap(), size);
        unsafe { libc::close(master) };
    }

    #[test]
    fn test_winsize_rejects_non_terminal() {
        let mut fds = [0; 2];
        assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
        let err = get_winsize(fds[0]).unwrap_err();
        assert_eq!(err.errno(), Some(libc::ENOTTY));
        unsafe {
            libc::close(fds[0]);
            libc::close(fds[1]);
        }
    }
}
