mod analyze_cmd;
mod browse;
mod config;
mod output;
mod sessions_cmd;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use dirscope_api_client::AnalyzeClient;
use dirscope_client::Navigator;
use dirscope_local_store::FileStore;

/// Navigator type used throughout the CLI.
pub(crate) type CliNavigator = Navigator<FileStore, AnalyzeClient>;

#[derive(Parser)]
#[command(
    name = "dirscope",
    about = "Browse a remote filesystem tree with session-scoped result caching"
)]
struct Cli {
    /// Analysis server base URL (overrides the config file)
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one directory and print its entries
    Analyze {
        /// Directory path on the server
        path: String,

        /// Bypass the session cache and fetch fresh data
        #[arg(long)]
        refresh: bool,

        /// Session to cache results under
        #[arg(long)]
        session: Option<String>,
    },

    /// Browse interactively starting from a directory
    Browse {
        /// Starting directory path on the server
        path: String,

        /// Session to cache results under
        #[arg(long)]
        session: Option<String>,
    },

    /// List saved sessions
    Sessions,

    /// Delete a session's cached results and registry entry
    Clear {
        /// Session name
        name: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::load_config()?;
    let base_url = cli.server.as_deref().unwrap_or(&config.server.url);
    let client = AnalyzeClient::new(base_url, Duration::from_secs(config.server.timeout_secs))?;

    let root = match &config.storage.root {
        Some(root) => PathBuf::from(root),
        None => config::default_store_root()?,
    };
    let store = match config.storage.max_blob_bytes {
        Some(limit) => FileStore::with_value_limit(root, limit),
        None => FileStore::new(root),
    };
    let mut nav = Navigator::new(store, client);

    match cli.command {
        Commands::Analyze {
            path,
            refresh,
            session,
        } => analyze_cmd::run_analyze(&mut nav, &path, refresh, session.as_deref()).await,
        Commands::Browse { path, session } => {
            browse::run_browse(&mut nav, &path, session.as_deref()).await
        }
        Commands::Sessions => sessions_cmd::run_sessions(&nav),
        Commands::Clear { name, yes } => sessions_cmd::run_clear(&mut nav, &name, yes),
    }
}
