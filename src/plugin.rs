// The plugin proper: one long-lived object owning the probe, its start
// timestamp, and a handle to the host's plugin directory. The host wires its
// command router to `handle_command` and its raw-message hook to
// `on_message`; both return the reply text to send back.

use std::sync::Arc;
use std::time::Instant;

use crate::directory::PluginDirectory;
use crate::probe::{self, SystemProbe};
use crate::report;

pub const USAGE: &str = "用法：/serverinfo [info|plugins|all]";

/// Identity the host displays for an installed plugin.
pub trait BotPlugin {
    fn name(&self) -> &'static str;
    fn version(&self) -> &'static str;
    fn description(&self) -> &'static str;
}

pub struct ServerInfoPlugin {
    started_at: Instant,
    probe: Box<dyn SystemProbe>,
    directory: Arc<dyn PluginDirectory>,
}

impl BotPlugin for ServerInfoPlugin {
    fn name(&self) -> &'static str {
        crate::PLUGIN_NAME
    }
    fn version(&self) -> &'static str {
        crate::PLUGIN_VERSION
    }
    fn description(&self) -> &'static str {
        "查询服务器状态与当前启用插件"
    }
}

impl ServerInfoPlugin {
    pub fn new(directory: Arc<dyn PluginDirectory>) -> Self {
        Self::with_probe(probe::detect(), directory)
    }

    pub fn with_probe(probe: Box<dyn SystemProbe>, directory: Arc<dyn PluginDirectory>) -> Self {
        Self {
            started_at: Instant::now(),
            probe,
            directory,
        }
    }

    async fn server_text(&mut self) -> String {
        report::server_report(self.probe.as_mut(), self.started_at).await
    }

    fn plugins_text(&self) -> String {
        report::plugins_report(&self.directory.plugins())
    }

    /// The `serverinfo` command with its optional sub-argument.
    pub async fn handle_command(&mut self, args: &str) -> String {
        match args.trim().to_lowercase().as_str() {
            "" | "info" | "server" | "服务器" => self.server_text().await,
            "plugins" | "plugin" | "pl" | "插件" => self.plugins_text(),
            "all" | "full" => {
                format!("{}\n\n{}", self.server_text().await, self.plugins_text())
            }
            other => {
                log::debug!("unknown serverinfo sub-command: {other}");
                USAGE.to_string()
            }
        }
    }

    /// Bare shortcut commands mirroring the two report types.
    pub async fn handle_server_shortcut(&mut self) -> String {
        self.server_text().await
    }

    pub fn handle_plugins_shortcut(&self) -> String {
        self.plugins_text()
    }

    /// Catch-all listener: answers only the exact trigger phrases (with an
    /// optional leading slash), stays silent otherwise.
    pub async fn on_message(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        let text = text.strip_prefix('/').unwrap_or(text).trim();
        match text {
            "服务器信息" => Some(self.server_text().await),
            "插件状态" => Some(self.plugins_text()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{PluginEntry, StaticDirectory};
    use crate::probe::{MemoryUsage, SAMPLE_DELAY};
    use async_trait::async_trait;

    /// Fixed-value probe so command tests stay off the real /proc.
    struct FakeProbe;

    #[async_trait]
    impl SystemProbe for FakeProbe {
        async fn cpu_percent(&mut self) -> Option<f64> {
            Some(42.5)
        }
        fn system_memory(&mut self) -> Option<MemoryUsage> {
            Some(MemoryUsage {
                used: 600 * 1024,
                total: 1000 * 1024,
            })
        }
        fn process_rss(&mut self) -> Option<u64> {
            Some(1536)
        }
    }

    fn plugin() -> ServerInfoPlugin {
        let directory = StaticDirectory::new(vec![
            PluginEntry {
                name: "serverinfo".to_string(),
                version: "1.0.2".to_string(),
                activated: true,
            },
            PluginEntry {
                name: "Dice".to_string(),
                version: "0.3.0".to_string(),
                activated: true,
            },
            PluginEntry {
                name: "weather".to_string(),
                version: "2.1.0".to_string(),
                activated: false,
            },
        ]);
        ServerInfoPlugin::with_probe(Box::new(FakeProbe), Arc::new(directory))
    }

    #[tokio::test]
    async fn test_unknown_sub_command_yields_usage_only() {
        let mut plugin = plugin();
        assert_eq!(plugin.handle_command("bogus").await, USAGE);
    }

    #[tokio::test]
    async fn test_info_sub_commands_render_server_report() {
        let mut plugin = plugin();
        for sub in ["", "info", "server", "服务器", "  INFO  "] {
            let reply = plugin.handle_command(sub).await;
            assert!(reply.starts_with("服务器信息："), "sub {sub:?}: {reply}");
            assert!(reply.contains("- CPU 占用：42.5%"));
            assert!(reply.contains("- 内存占用：600.0KB / 1000.0KB (60.0%)"));
            assert!(reply.contains("- 本进程内存：1.5KB"));
        }
    }

    #[tokio::test]
    async fn test_plugins_sub_command_partitions_and_counts() {
        let mut plugin = plugin();
        let reply = plugin.handle_command("plugins").await;
        assert!(reply.starts_with("插件状态：启用 2 / 总计 3"));
        let enabled_block = reply.find("- Dice").unwrap();
        let also_enabled = reply.find("- serverinfo").unwrap();
        let disabled_header = reply.find("未启用插件：").unwrap();
        assert!(enabled_block < also_enabled);
        assert!(also_enabled < disabled_header);
        assert!(reply.contains("- weather (2.1.0)"));
    }

    #[tokio::test]
    async fn test_all_joins_both_reports() {
        let mut plugin = plugin();
        let reply = plugin.handle_command("all").await;
        let parts: Vec<&str> = reply.split("\n\n").collect();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].starts_with("服务器信息："));
        assert!(parts[1].starts_with("插件状态："));
    }

    #[tokio::test]
    async fn test_on_message_exact_phrases_only() {
        let mut plugin = plugin();
        assert!(plugin.on_message("服务器信息").await.is_some());
        assert!(plugin.on_message("/插件状态").await.is_some());
        assert!(plugin.on_message(" 服务器信息 ").await.is_some());
        assert!(plugin.on_message("服务器信息吗").await.is_none());
        assert!(plugin.on_message("status").await.is_none());
        assert!(plugin.on_message("").await.is_none());
    }

    #[tokio::test]
    async fn test_shortcuts_match_primary_command() {
        let mut plugin = plugin();
        let via_shortcut = plugin.handle_plugins_shortcut();
        let via_command = plugin.handle_command("插件").await;
        assert_eq!(via_shortcut, via_command);
        assert!(plugin
            .handle_server_shortcut()
            .await
            .starts_with("服务器信息："));
    }

    /// A probe whose sources all fail still produces a report: the optional
    /// lines drop out, nothing errors.
    struct DeadProbe;

    #[async_trait]
    impl SystemProbe for DeadProbe {
        async fn cpu_percent(&mut self) -> Option<f64> {
            None
        }
        fn system_memory(&mut self) -> Option<MemoryUsage> {
            None
        }
        fn process_rss(&mut self) -> Option<u64> {
            None
        }
    }

    #[tokio::test]
    async fn test_report_degrades_line_by_line() {
        let mut plugin =
            ServerInfoPlugin::with_probe(Box::new(DeadProbe), Arc::new(StaticDirectory::default()));
        let reply = plugin.handle_command("").await;
        assert!(reply.starts_with("服务器信息："));
        assert!(!reply.contains("CPU 占用"));
        assert!(!reply.contains("内存占用"));
        assert!(!reply.contains("本进程内存"));
        assert!(reply.contains("- 进程 PID："));
    }

    #[test]
    fn test_cold_sample_delay_is_short() {
        // The only suspension the command path may take is the one cold
        // sample pause.
        assert!(SAMPLE_DELAY.as_millis() <= 500);
    }
}
