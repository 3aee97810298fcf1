#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use std::sync::Arc;

#[cfg(feature = "std")]
use clap::Parser;
#[cfg(feature = "std")]
use seabattle::{
    init_logging, validate, Board, BoardReport, GameServer, InMemoryStore, ServerConfig,
    SystemClock, DEFAULT_BIND,
};
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
#[cfg(feature = "std")]
enum Commands {
    /// Run the game server with an in-memory store.
    Serve {
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
        #[arg(long, default_value_t = 3, help = "Seconds between matchmaking queue polls")]
        match_interval_secs: u64,
        #[arg(long, default_value_t = 3600, help = "Seconds between idle-session sweeps")]
        reap_interval_secs: u64,
        #[arg(long, default_value_t = 3600, help = "Seconds of inactivity before a session is evicted")]
        idle_threshold_secs: u64,
    },
    /// Validate a board stored as JSON: {"field": [[0, 1, ...], ...]}.
    Validate {
        /// Path to the board file.
        path: std::path::PathBuf,
    },
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Commands::Serve {
            bind,
            match_interval_secs,
            reap_interval_secs,
            idle_threshold_secs,
        } => {
            let config = ServerConfig {
                bind,
                match_interval: Duration::from_secs(match_interval_secs),
                reap_interval: Duration::from_secs(reap_interval_secs),
                idle_threshold: Duration::from_secs(idle_threshold_secs),
            };
            let server = GameServer::new(
                config,
                Arc::new(InMemoryStore::new()),
                Arc::new(SystemClock),
            );
            let shutdown = server.shutdown_handle();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("interrupt received");
                }
                shutdown.trigger();
            });
            server.bind_and_run().await?;
        }
        Commands::Validate { path } => {
            let json = std::fs::read_to_string(&path)?;
            let board = Board::from_json(&json).map_err(|e| anyhow::anyhow!(e))?;
            print!("{}", board);
            let validation = validate(&board);
            let report = BoardReport {
                status: validation.is_valid(),
                ships: validation.counts,
            };
            println!("{}", serde_json::to_string(&report)?);
            if !validation.is_valid() {
                println!("{}", validation.verdict);
            }
        }
    }
    Ok(())
}
