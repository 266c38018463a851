use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collection::store;
use collector::inspect::run_inspect;
use collector::Collector;
use common::{logging, AppConfig};
use tracing::info;
use tracker::RoundupTracker;

#[derive(Parser, Debug)]
#[command(name = "tracker-stats", version, about = "Cache issue tracker data and chart it")]
struct Cli {
    /// Directory holding config/default.* and config/local.*
    #[arg(long, global = true, default_value = ".", env = "TRACKER_STATS_CONFIG_DIR")]
    config_dir: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch enumerations, issues and users from the tracker and refresh the cache
    Download {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Regenerate the chart script from the cached collection
    Summarize,
    /// Browse the cached collection interactively
    Inspect,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);
    let mut config = AppConfig::load_from_path(&cli.config_dir).context("loading configuration")?;

    match cli.command {
        Command::Download { username, password } => {
            if username.is_some() {
                config.tracker.username = username;
            }
            if password.is_some() {
                config.tracker.password = password;
            }
            let (base, credentials) = config.tracker.require_credentials()?;

            info!(tracker = %base, user = %credentials.username, cache = %config.cache.dir.display(), "starting download");
            let tracker = Arc::new(RoundupTracker::new(&config.tracker)?);
            let collector = Collector::new(config.cache.clone(), tracker);
            collector.download().await?;
        }
        Command::Summarize => {
            let collection = store::load(&config.cache.collection_path())?;
            let summary = analysis::summarize(&collection);
            analysis::write_script(&config.output.script_path(), &summary)?;
        }
        Command::Inspect => {
            let collection = store::load(&config.cache.collection_path())?;
            let stdin = std::io::stdin();
            run_inspect(&collection, stdin.lock(), std::io::stdout())?;
        }
    }
    Ok(())
}
