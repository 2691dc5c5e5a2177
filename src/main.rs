use anyhow::{Context, Result};
use clap::Parser;
use tradepro::cli::{self, Cli};
use tradepro::session::Session;
use tradepro::{account, chart, logging, report, tail};

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    logging::set_silent(cli.quiet);

    let command = cli.command();
    let session = Session::open_dir(&cli.data_dir)
        .with_context(|| format!("failed to open data directory {:?}", cli.data_dir))?;

    match command {
        cli::Command::Tail(args) => tail::run(args, &session).await,
        cli::Command::Chart(args) => chart::run(args).await,
        cli::Command::Login(args) => account::login(args, &session),
        cli::Command::Logout => account::logout(&session),
        cli::Command::Whoami => account::whoami(&session),
        cli::Command::Toggle(args) => account::toggle(args, &session),
        cli::Command::Watchlist => account::watchlist(&session),
        cli::Command::Portfolio(args) => report::portfolio(args, &session),
        cli::Command::Insight(args) => report::insight(args, &session),
        cli::Command::Reset => account::reset(&session),
    }
}
