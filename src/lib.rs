pub mod directory;
pub mod plugin;
pub mod probe;
pub mod report;

pub use crate::plugin::ServerInfoPlugin;

pub const PLUGIN_NAME: &str = "serverinfo";
pub const PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const BANNER: &str = r#"
╔═══════════════════════════════════════════╗
║   serverinfo – host vitals for chat bots  ║
╚═══════════════════════════════════════════╝
"#;
