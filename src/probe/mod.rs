// Metric probes for the serverinfo plugin.
// A probe answers the three per-host questions the report needs (CPU percent,
// system memory, process RSS); disk and load are plain calls and live here as
// free functions.

pub mod native;
pub mod procfs;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Delay between the two reads of a cold CPU sample.
pub const SAMPLE_DELAY: Duration = Duration::from_millis(100);

/// Used/total system memory in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryUsage {
    pub used: u64,
    pub total: u64,
}

/// Used/total disk space in bytes for one filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub used: u64,
    pub total: u64,
}

/// Strategy seam between the sysinfo-backed probe and the /proc fallback.
/// Every accessor is best-effort: `None` means "omit the line", never an
/// error the caller has to handle.
#[async_trait]
pub trait SystemProbe: Send {
    /// Instantaneous whole-machine CPU usage. The first call may suspend
    /// for [`SAMPLE_DELAY`] to let the counters advance.
    async fn cpu_percent(&mut self) -> Option<f64>;

    fn system_memory(&mut self) -> Option<MemoryUsage>;

    /// Resident set size of the current process, in bytes.
    fn process_rss(&mut self) -> Option<u64>;
}

/// Pick the sysinfo-backed probe where the library supports the platform,
/// the /proc fallback otherwise.
pub fn detect() -> Box<dyn SystemProbe> {
    if sysinfo::IS_SUPPORTED_SYSTEM {
        Box::new(native::NativeProbe::new())
    } else {
        log::debug!("sysinfo unsupported on this platform, using /proc fallback");
        Box::new(procfs::ProcProbe::new())
    }
}

/// Filesystem usage for the filesystem holding `path`.
#[cfg(unix)]
pub fn disk_usage(path: &Path) -> Option<DiskUsage> {
    let stat = match nix::sys::statvfs::statvfs(path) {
        Ok(stat) => stat,
        Err(err) => {
            log::debug!("statvfs({}) failed: {err}", path.display());
            return None;
        }
    };
    let frsize = stat.fragment_size() as u64;
    let total = frsize.checked_mul(stat.blocks() as u64)?;
    let free = frsize.checked_mul(stat.blocks_available() as u64)?;
    Some(DiskUsage {
        used: total.saturating_sub(free),
        total,
    })
}

#[cfg(not(unix))]
pub fn disk_usage(_path: &Path) -> Option<DiskUsage> {
    None
}

/// 1/5/15-minute load averages where the platform exposes them.
#[cfg(unix)]
pub fn load_average() -> Option<(f64, f64, f64)> {
    let mut loads = [0f64; 3];
    let written = unsafe { libc::getloadavg(loads.as_mut_ptr(), 3) };
    (written == 3).then(|| (loads[0], loads[1], loads[2]))
}

#[cfg(not(unix))]
pub fn load_average() -> Option<(f64, f64, f64)> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_disk_usage_current_dir() {
        let usage = disk_usage(Path::new(".")).expect("statvfs on cwd");
        assert!(usage.total > 0);
        assert!(usage.used <= usage.total);
    }

    #[cfg(unix)]
    #[test]
    fn test_load_average_has_three_values() {
        let (one, five, fifteen) = load_average().expect("getloadavg");
        assert!(one >= 0.0 && five >= 0.0 && fifteen >= 0.0);
    }
}
