//! screenctl: screen names against global sanctions and export-control lists
//!
//! Exit status reflects whether the operation completed, never the
//! decision: PASS/REVIEW/BLOCK is data, not an error.

use anyhow::Context;
use clap::{Parser, Subcommand};
use list_adapters::FetchOptions;
use screenctl::commands::{self, ScreenArgs, UpdateArgs};
use screenctl::report;
use screening_core::{Config, IndexCache};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(
    name = "screenctl",
    about = "Screen names against global sanctions lists (OFAC, UN, EU, UK)",
    version
)]
struct Cli {
    /// Data directory holding snapshots and audit logs
    #[arg(long, env = "SCREEN_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Optional TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download all watchlist sources and create a new immutable snapshot
    Update {
        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 120)]
        timeout: u64,

        /// User-Agent header sent to list publishers
        #[arg(long)]
        user_agent: Option<String>,

        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,

        /// Abort on the first failed source instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Screen a name against the latest or a given snapshot
    Screen {
        /// Person or organization name to screen
        name: String,

        /// Screen against this snapshot instead of the latest
        #[arg(long)]
        snapshot_id: Option<String>,

        /// Maximum number of hits returned
        #[arg(long)]
        top_k: Option<usize>,

        /// Minimum score for a hit to surface
        #[arg(long)]
        review_threshold: Option<f64>,

        /// Minimum score to auto-block
        #[arg(long)]
        block_threshold: Option<f64>,

        /// Print the raw ScreeningResult as JSON instead of the report
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::from_env()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    match cli.command {
        Command::Update {
            timeout,
            user_agent,
            insecure,
            strict,
        } => {
            let mut fetch = FetchOptions {
                timeout: Duration::from_secs(timeout),
                verify_tls: !insecure,
                ..Default::default()
            };
            if let Some(user_agent) = user_agent {
                fetch.user_agent = user_agent;
            }

            let snapshot_id = commands::run_update(&UpdateArgs {
                data_dir: config.data_dir.clone(),
                fetch,
                strict,
            })
            .await?;

            println!("{}", snapshot_id);
        }

        Command::Screen {
            name,
            snapshot_id,
            top_k,
            review_threshold,
            block_threshold,
            json,
        } => {
            let mut options = config.screen_options();
            if let Some(top_k) = top_k {
                options.top_k = top_k;
            }
            if let Some(review_threshold) = review_threshold {
                options.review_threshold = review_threshold;
            }
            if let Some(block_threshold) = block_threshold {
                options.block_threshold = block_threshold;
            }

            let scorer = config.scorer()?;
            let cache = IndexCache::new();
            let result = commands::run_screen(
                &ScreenArgs {
                    data_dir: config.data_dir.clone(),
                    query: name,
                    snapshot_id,
                    options,
                    scorer,
                },
                &cache,
            )?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                report::print_report(&result, &scorer);
            }
        }
    }

    Ok(())
}
