// sysinfo-backed probe, preferred wherever the library supports the host.

use async_trait::async_trait;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, Pid, ProcessRefreshKind, RefreshKind, System};

use super::{MemoryUsage, SystemProbe, SAMPLE_DELAY};

pub struct NativeProbe {
    sys: System,
    // sysinfo derives CPU usage from the delta since the previous refresh,
    // so the very first query needs a second refresh after a pause.
    warmed: bool,
}

impl NativeProbe {
    pub fn new() -> Self {
        let refresh = RefreshKind::new()
            .with_cpu(CpuRefreshKind::new().with_cpu_usage())
            .with_memory(MemoryRefreshKind::everything());
        Self {
            sys: System::new_with_specifics(refresh),
            warmed: false,
        }
    }
}

impl Default for NativeProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemProbe for NativeProbe {
    async fn cpu_percent(&mut self) -> Option<f64> {
        self.sys.refresh_cpu_usage();
        if !self.warmed {
            tokio::time::sleep(SAMPLE_DELAY.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL)).await;
            self.sys.refresh_cpu_usage();
            self.warmed = true;
        }
        if self.sys.cpus().is_empty() {
            return None;
        }
        Some(f64::from(self.sys.global_cpu_info().cpu_usage()))
    }

    fn system_memory(&mut self) -> Option<MemoryUsage> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return None;
        }
        Some(MemoryUsage {
            used: self.sys.used_memory(),
            total,
        })
    }

    fn process_rss(&mut self) -> Option<u64> {
        let pid = Pid::from_u32(std::process::id());
        if !self
            .sys
            .refresh_process_specifics(pid, ProcessRefreshKind::new().with_memory())
        {
            return None;
        }
        self.sys.process(pid).map(|p| p.memory())
    }
}
