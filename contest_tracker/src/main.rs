mod cmd;
mod modules;

use crate::{
    cmd::{
        bookmark::{self, BookmarkArgs},
        filter::{self, FilterArgs},
        list::{self, ListArgs},
        solution::{self, SolutionArgs},
        sync::{self, SyncArgs},
        watch::{self, WatchArgs},
    },
    modules::config::Config,
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::{env, io, path::PathBuf, str::FromStr};
use tokio::runtime::Builder;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{self, time::OffsetTime},
};

#[derive(Debug, Parser)]
#[command(name = "contest_tracker")]
#[command(about = "Track upcoming and past programming contests")]
struct Cli {
    /// Base url of the contest service [env: CONTEST_API_URL]
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// File the filter preferences are kept in [env: CONTEST_TRACKER_PREFERENCES]
    #[arg(long, global = true)]
    preferences: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the visible contests of one tab
    List(ListArgs),
    /// Follow the countdowns of the visible upcoming contests
    Watch(WatchArgs),
    /// Toggle the bookmark of a contest
    Bookmark(BookmarkArgs),
    /// Attach a solution url to a past contest
    Solution(SolutionArgs),
    /// Ask the service to synchronize contests from the platforms
    Sync(SyncArgs),
    /// Show or change the contest filter
    Filter(FilterArgs),
}

fn main() -> Result<()> {
    dotenv().ok();

    let log_level = env::var("RUST_LOG").unwrap_or(String::from("info"));
    let filter = EnvFilter::builder()
        .with_default_directive(
            LevelFilter::from_str(&log_level)
                .context("couldn't parse specified log level")?
                .into(),
        )
        .from_env_lossy();
    let format = fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_timer(OffsetTime::local_rfc_3339().context("couldn't determine local offset")?);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(format)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let cli = Cli::parse();
    let config = Config::from_env(cli.api_url, cli.preferences)?;
    let runtime = Builder::new_multi_thread().enable_all().build()?;

    let result = match cli.command {
        Commands::List(args) => runtime.block_on(list::run(args, &config)),
        Commands::Watch(args) => runtime.block_on(watch::run(args, &config)),
        Commands::Bookmark(args) => runtime.block_on(bookmark::run(args, &config)),
        Commands::Solution(args) => runtime.block_on(solution::run(args, &config)),
        Commands::Sync(args) => runtime.block_on(sync::run(args, &config)),
        Commands::Filter(args) => runtime.block_on(filter::run(args, &config)),
    };
    if let Err(e) = &result {
        tracing::error!("command failed: {:?}", e);
    }

    result
}
