// /proc-parsing fallback probe. Used when sysinfo does not support the
// platform (and by the `--proc-fallback` flag of the demo shell).

use async_trait::async_trait;
use std::fs;

use super::{MemoryUsage, SystemProbe, SAMPLE_DELAY};

const PROC_STAT: &str = "/proc/stat";
const PROC_MEMINFO: &str = "/proc/meminfo";
const PROC_SELF_STATUS: &str = "/proc/self/status";

/// One reading of the kernel's cumulative CPU tick counters. Only the delta
/// between two samples carries meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSample {
    pub total: u64,
    pub idle: u64,
}

/// CPU percent over the interval between `prev` and `next`. `None` when the
/// counters did not advance (or wrapped).
pub fn cpu_percent_between(prev: CpuSample, next: CpuSample) -> Option<f64> {
    let d_total = next.total as i64 - prev.total as i64;
    if d_total <= 0 {
        return None;
    }
    let d_idle = next.idle as i64 - prev.idle as i64;
    let used = (d_total - d_idle).max(0);
    Some(used as f64 / d_total as f64 * 100.0)
}

/// Parse the aggregate `cpu` line of /proc/stat. Idle time counts the idle
/// and iowait columns.
pub fn parse_cpu_line(line: &str) -> Option<CpuSample> {
    let mut fields = line.split_whitespace();
    if fields.next() != Some("cpu") {
        return None;
    }
    let ticks: Vec<u64> = fields.map(|f| f.parse().ok()).collect::<Option<_>>()?;
    if ticks.len() < 4 {
        return None;
    }
    Some(CpuSample {
        total: ticks.iter().sum(),
        idle: ticks[3] + ticks.get(4).copied().unwrap_or(0),
    })
}

/// Parse MemTotal/MemAvailable (kB) out of /proc/meminfo into used/total
/// bytes.
pub fn parse_meminfo(contents: &str) -> Option<MemoryUsage> {
    let mut total_kb = None;
    let mut avail_kb = None;
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            total_kb = first_number(rest);
        } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
            avail_kb = first_number(rest);
        }
    }
    let (total_kb, avail_kb) = (total_kb?, avail_kb?);
    Some(MemoryUsage {
        used: total_kb.saturating_sub(avail_kb) * 1024,
        total: total_kb * 1024,
    })
}

/// Parse the VmRSS field (kB) of /proc/self/status into bytes.
pub fn parse_vmrss(contents: &str) -> Option<u64> {
    contents
        .lines()
        .find_map(|line| line.strip_prefix("VmRSS:"))
        .and_then(first_number)
        .map(|kb| kb * 1024)
}

fn first_number(rest: &str) -> Option<u64> {
    rest.split_whitespace().next()?.parse().ok()
}

fn read_cpu_sample() -> Option<CpuSample> {
    let contents = fs::read_to_string(PROC_STAT).ok()?;
    parse_cpu_line(contents.lines().next()?)
}

/// Fallback probe with the two-state CPU sampler: cold (no prior sample,
/// takes a delayed second reading) and warm (delta against the stored one).
pub struct ProcProbe {
    last_cpu: Option<CpuSample>,
}

impl ProcProbe {
    pub fn new() -> Self {
        Self { last_cpu: None }
    }
}

impl Default for ProcProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SystemProbe for ProcProbe {
    async fn cpu_percent(&mut self) -> Option<f64> {
        let current = read_cpu_sample()?;
        let (prev, next) = match self.last_cpu {
            Some(prev) => (prev, current),
            None => {
                // Cold start: let the counters advance before the second read.
                tokio::time::sleep(SAMPLE_DELAY).await;
                (current, read_cpu_sample()?)
            }
        };
        self.last_cpu = Some(next);
        cpu_percent_between(prev, next)
    }

    fn system_memory(&mut self) -> Option<MemoryUsage> {
        parse_meminfo(&fs::read_to_string(PROC_MEMINFO).ok()?)
    }

    fn process_rss(&mut self) -> Option<u64> {
        parse_vmrss(&fs::read_to_string(PROC_SELF_STATUS).ok()?)
    }
}
