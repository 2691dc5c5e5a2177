use anyhow::{bail, Result};
use clap::Args;

use crate::cli::FeedArgs;
use crate::feed::PriceFeed;
use crate::insight::InsightGenerator;
use crate::model::Ticker;
use crate::portfolio::{Portfolio, Valuation};
use crate::quote;
use crate::session::Session;

#[derive(Debug, Args, Clone)]
pub struct PortfolioArgs {
    /// Advance the walk this many ticks before valuing
    #[arg(short, long, default_value_t = 0)]
    pub ticks: usize,

    #[command(flatten)]
    pub feed: FeedArgs,
}

#[derive(Debug, Args, Clone)]
pub struct InsightArgs {
    pub symbol: Ticker,

    #[command(flatten)]
    pub feed: FeedArgs,
}

pub fn portfolio(args: PortfolioArgs, session: &Session) -> Result<()> {
    let Some(identity) = session.current_user() else {
        bail!("log in to see a portfolio");
    };

    let feed = PriceFeed::from_config(&args.feed.config());
    let quotes = advance(&feed, args.ticks);
    let valuation = Portfolio::from_watchlist(session.subscribed_symbols()).value(&quotes);

    println!("Portfolio for {}", identity.email);
    print_valuation(&valuation);
    Ok(())
}

pub fn insight(args: InsightArgs, session: &Session) -> Result<()> {
    let feed = PriceFeed::from_config(&args.feed.config());
    let quotes = feed.tick();
    let Some(quote) = quote::find(&quotes, args.symbol.symbol()) else {
        bail!("{} is not part of the simulated universe", args.symbol);
    };

    let mut generator = match args.feed.seed {
        Some(seed) => InsightGenerator::seeded(seed),
        None => InsightGenerator::from_entropy(),
    };
    let insight = generator.insight_for(quote);

    let watched = if session.is_subscribed(&quote.symbol) {
        " [watched]"
    } else {
        ""
    };
    println!(
        "{} ({}){}: {:.2} ({:+.2}%)",
        quote.name, quote.symbol, watched, quote.price, quote.change_percent
    );
    println!(
        "AI insight [{}, {}% confidence]: {}",
        insight.sentiment, insight.confidence, insight.text
    );
    Ok(())
}

/// Tick `ticks` times and return the latest quotes, resting prices when zero.
fn advance(feed: &PriceFeed, ticks: usize) -> Vec<quote::Quote> {
    let mut quotes = feed.current_stocks();
    for _ in 0..ticks {
        quotes = feed.tick();
    }
    quotes
}

fn print_valuation(valuation: &Valuation) {
    if valuation.is_empty() {
        println!("Portfolio empty; toggle symbols onto the watchlist to see them here.");
        return;
    }

    println!(
        "{:<6} | {:>6} | {:>12} | {:>12} | {:>14} | {:>22}",
        "asset", "shares", "avg cost", "price", "value", "unrealized p&l"
    );
    for position in &valuation.positions {
        println!(
            "{:<6} | {:>6} | {:>12.2} | {:>12.2} | {:>14.2} | {:>22}",
            position.symbol,
            position.shares,
            position.avg_cost,
            position.current_price,
            position.current_value,
            format!("{:+.2} ({:+.2}%)", position.pl, position.pl_percent),
        );
    }
    println!("Net worth: {:.2}", valuation.total_value);
}
