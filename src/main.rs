use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use serverinfo::directory::StaticDirectory;
use serverinfo::probe::procfs::ProcProbe;
use serverinfo::{ServerInfoPlugin, BANNER, PLUGIN_VERSION};

/// Local driver for the serverinfo plugin: feeds typed lines through the
/// same handlers a bot host would call.
#[derive(Parser)]
#[command(name = "serverinfo", version = PLUGIN_VERSION)]
struct Args {
    /// TOML manifest listing sibling plugins ([[plugin]] name/version/activated)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Force the /proc fallback probe instead of sysinfo
    #[arg(long)]
    proc_fallback: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let directory = match &args.manifest {
        Some(path) => StaticDirectory::from_manifest(path)?,
        None => {
            log::info!("no manifest given, listing only this plugin");
            StaticDirectory::builtin()
        }
    };
    let directory = Arc::new(directory);

    let mut plugin = if args.proc_fallback {
        ServerInfoPlugin::with_probe(Box::new(ProcProbe::new()), directory)
    } else {
        ServerInfoPlugin::new(directory)
    };

    println!("{BANNER}");
    println!("Commands: serverinfo [info|plugins|all], 服务器信息, 插件状态, exit\n");

    loop {
        print!("serverinfo> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" {
            break;
        }

        let reply = match input.split_once(char::is_whitespace) {
            Some(("serverinfo", rest)) => plugin.handle_command(rest).await,
            None if input == "serverinfo" => plugin.handle_command("").await,
            _ => match plugin.on_message(input).await {
                Some(reply) => reply,
                None => format!("Unknown command: {input}. Try 'serverinfo'."),
            },
        };
        println!("{reply}");
    }

    Ok(())
}
