use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::account::{LoginArgs, ToggleArgs};
use crate::chart::ChartArgs;
use crate::constants::{DATA_DIR_ENV, DEFAULT_DATA_DIR, TICK_INTERVAL_MS};
use crate::feed::FeedConfig;
use crate::report::{InsightArgs, PortfolioArgs};
use crate::tail::TailArgs;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Simulated equity price feed with per-user watchlists"
)]
pub struct Cli {
    /// Directory holding the local identity and watchlist store
    #[arg(long, global = true, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Suppress structured log lines on stderr
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn command(&mut self) -> Command {
        self.command.take().unwrap_or_default()
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stream live quotes for the watchlist (or the whole universe)
    Tail(TailArgs),
    /// Run the feed for a while and render an ASCII price chart
    Chart(ChartArgs),
    /// Record a local identity and make it active
    Login(LoginArgs),
    /// Forget the active identity; watchlists are kept
    Logout,
    /// Show the active identity
    Whoami,
    /// Add a symbol to the watchlist, or remove it if already present
    Toggle(ToggleArgs),
    /// List watched symbols
    Watchlist,
    /// Value synthetic holdings for the watched symbols
    Portfolio(PortfolioArgs),
    /// Print the trading insight for one symbol
    Insight(InsightArgs),
    /// Delete every stored identity and watchlist
    Reset,
}

impl Default for Command {
    fn default() -> Self {
        Command::Tail(TailArgs::default())
    }
}

/// Options shared by commands that run the price feed.
#[derive(Debug, Args, Clone)]
pub struct FeedArgs {
    /// Milliseconds between price ticks
    #[arg(long, default_value_t = TICK_INTERVAL_MS)]
    pub tick_ms: u64,

    /// Seed for a reproducible random walk
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Default for FeedArgs {
    fn default() -> Self {
        Self {
            tick_ms: TICK_INTERVAL_MS,
            seed: None,
        }
    }
}

impl FeedArgs {
    pub fn config(&self) -> FeedConfig {
        FeedConfig {
            tick_interval: Duration::from_millis(self.tick_ms.max(1)),
            seed: self.seed,
            ..FeedConfig::default()
        }
    }
}
