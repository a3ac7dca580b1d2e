/*!
 * Sysinfo Marshaling
 * Linux `struct sysinfo` decoded into a plain value record
 */

use serde::{Deserialize, Serialize};

/// System-wide statistics snapshot
///
/// Memory fields are in units of `mem_unit` bytes, exactly as the kernel
/// reports them. Load averages are converted from the kernel's 16.16
/// fixed-point representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SysinfoInfo {
    /// Seconds since boot
    pub uptime: i64,
    /// 1, 5 and 15 minute load averages
    pub loads: (f64, f64, f64),
    pub total_ram: u64,
    pub free_ram: u64,
    pub shared_ram: u64,
    pub buffer_ram: u64,
    pub total_swap: u64,
    pub free_swap: u64,
    pub procs: u16,
    pub total_high: u64,
    pub free_high: u64,
    /// Byte size of one memory unit for the fields above
    pub mem_unit: u32,
}

#[cfg(target_os = "linux")]
impl SysinfoInfo {
    const LOAD_SCALE: f64 = 65536.0;

    pub(crate) fn decode(si: &libc::sysinfo) -> Self {
        Self {
            uptime: si.uptime as i64,
            loads: (
                si.loads[0] as f64 / Self::LOAD_SCALE,
                si.loads[1] as f64 / Self::LOAD_SCALE,
                si.loads[2] as f64 / Self::LOAD_SCALE,
            ),
            total_ram: si.totalram as u64,
            free_ram: si.freeram as u64,
            shared_ram: si.sharedram as u64,
            buffer_ram: si.bufferram as u64,
            total_swap: si.totalswap as u64,
            free_swap: si.freeswap as u64,
            procs: si.procs,
            total_high: si.totalhigh as u64,
            free_high: si.freehigh as u64,
            mem_unit: si.mem_unit,
        }
    }
}
