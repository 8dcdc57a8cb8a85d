// Plain-text report rendering. Every metric line is independently
// best-effort: an unavailable source drops its line and the rest of the
// report still goes out.

use std::path::Path;
use std::time::{Duration, Instant};
use sysinfo::System;

use crate::directory::PluginEntry;
use crate::probe::{self, MemoryUsage, SystemProbe};

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human-readable byte count, one decimal, capped at TB.
pub fn format_bytes(n: u64) -> String {
    let mut size = n as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1}{}", UNITS[unit])
}

/// Elapsed time as `H:MM:SS` (hours unbounded).
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

pub(crate) fn memory_line(mem: MemoryUsage) -> String {
    format!(
        "- 内存占用：{} / {} ({:.1}%)",
        format_bytes(mem.used),
        format_bytes(mem.total),
        mem.used as f64 / mem.total as f64 * 100.0
    )
}

/// Build the full server report. `started_at` is the plugin's construction
/// time, reported as its uptime.
pub async fn server_report(probe: &mut dyn SystemProbe, started_at: Instant) -> String {
    let mut lines = vec!["服务器信息：".to_string()];
    if let Some(host) = System::host_name() {
        lines.push(format!("- 主机名：{host}"));
    }
    if let Some(os) = System::long_os_version() {
        lines.push(format!("- 平台：{os}"));
    }
    if let Some(kernel) = System::kernel_version() {
        lines.push(format!("- 内核：{kernel}"));
    }
    lines.push(format!("- 插件版本：{}", crate::PLUGIN_VERSION));
    lines.push(format!("- 进程 PID：{}", std::process::id()));
    lines.push(format!(
        "- 运行时长（本插件）：{}",
        format_duration(started_at.elapsed())
    ));
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(0);
    lines.push(format!("- CPU 核心数：{cores}"));
    if let Some(percent) = probe.cpu_percent().await {
        lines.push(format!("- CPU 占用：{percent:.1}%"));
    }
    if let Some(mem) = probe.system_memory() {
        if mem.total > 0 {
            lines.push(memory_line(mem));
        }
    }
    if let Some(rss) = probe.process_rss() {
        lines.push(format!("- 本进程内存：{}", format_bytes(rss)));
    }
    if let Some((one, five, fifteen)) = probe::load_average() {
        lines.push(format!("- 系统负载：{one:.2} / {five:.2} / {fifteen:.2}"));
    }
    if let Some(disk) = probe::disk_usage(Path::new(".")) {
        lines.push(format!(
            "- 磁盘(当前目录)：已用 {} / 总计 {}",
            format_bytes(disk.used),
            format_bytes(disk.total)
        ));
    }
    lines.join("\n")
}

/// Partition the directory's entries by `activated` and render both groups,
/// each sorted case-insensitively by name.
pub fn plugins_report(entries: &[PluginEntry]) -> String {
    let mut enabled: Vec<&PluginEntry> = entries.iter().filter(|e| e.activated).collect();
    let mut disabled: Vec<&PluginEntry> = entries.iter().filter(|e| !e.activated).collect();
    enabled.sort_by_key(|e| e.name.to_lowercase());
    disabled.sort_by_key(|e| e.name.to_lowercase());

    let mut lines = vec![
        format!("插件状态：启用 {} / 总计 {}", enabled.len(), entries.len()),
        "已启用插件：".to_string(),
    ];
    if enabled.is_empty() {
        lines.push("- 无".to_string());
    } else {
        for entry in enabled {
            lines.push(format!("- {} ({})", entry.name, entry.version));
        }
    }
    if !disabled.is_empty() {
        lines.push("未启用插件：".to_string());
        for entry in disabled {
            lines.push(format!("- {} ({})", entry.name, entry.version));
        }
    }
    lines.join("\n")
}
