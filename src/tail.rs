use anyhow::Result;
use clap::Args;
use serde_json::json;
use tokio::signal;
use tokio::sync::mpsc;

use crate::cli::FeedArgs;
use crate::feed::PriceFeed;
use crate::logging;
use crate::quote::Quote;
use crate::session::Session;

#[derive(Debug, Args, Clone, Default)]
pub struct TailArgs {
    /// Show every instrument instead of the watchlist
    #[arg(short, long)]
    pub all: bool,

    /// Filter quotes to a single symbol (e.g. GOOG)
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Stop after this many ticks
    #[arg(short, long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub feed: FeedArgs,
}

pub async fn run(args: TailArgs, session: &Session) -> Result<()> {
    let config = args.feed.config();
    let feed = PriceFeed::from_config(&config);
    let symbol = args.symbol.as_deref().map(str::to_ascii_uppercase);

    let use_watchlist = !args.all && symbol.is_none();
    if use_watchlist && session.subscribed_symbols().is_empty() {
        println!("Watchlist is empty (log in and `toggle` a symbol); streaming the full universe.");
    }

    let (tx, mut rx) = mpsc::unbounded_channel::<Vec<Quote>>();
    let subscription = feed.subscribe(move |quotes| {
        let _ = tx.send(quotes.to_vec());
    });
    feed.start(config.tick_interval);

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    println!(
        "{:>6} | {:>6} | {:<22} | {:>12} | {:>10} | {:>8}",
        "tick", "symbol", "name", "price", "change", "change%"
    );

    let mut ticks_seen = 0usize;
    loop {
        let snapshot = tokio::select! {
            received = rx.recv() => match received {
                Some(snapshot) => snapshot,
                None => break,
            },
            _ = &mut shutdown => {
                logging::info_simple("tail.interrupt", "Interrupted; stopping quote stream");
                break;
            }
        };

        let rows = select_rows(session, &snapshot, use_watchlist, symbol.as_deref());
        for quote in &rows {
            print_row(ticks_seen, quote);
        }

        if let Some(limit) = args.limit {
            if ticks_seen >= limit {
                break;
            }
        }
        ticks_seen += 1;
    }

    feed.stop().await;
    subscription.unsubscribe();
    logging::info(
        "tail.stop",
        "Quote stream finished",
        json!({ "ticks": feed.ticks_elapsed() }),
    );
    Ok(())
}

fn select_rows(
    session: &Session,
    snapshot: &[Quote],
    use_watchlist: bool,
    symbol: Option<&str>,
) -> Vec<Quote> {
    if let Some(symbol) = symbol {
        return snapshot
            .iter()
            .filter(|quote| quote.symbol == symbol)
            .cloned()
            .collect();
    }

    if use_watchlist {
        let watched = session.subscriptions().filter_quotes(snapshot);
        if !watched.is_empty() {
            return watched;
        }
    }
    snapshot.to_vec()
}

fn print_row(tick: usize, quote: &Quote) {
    let sign = if quote.is_up() { "+" } else { "" };
    println!(
        "{:>6} | {:>6} | {:<22} | {:>12.2} | {:>10} | {:>8}",
        tick,
        quote.symbol,
        quote.name,
        quote.price,
        format!("{sign}{:.2}", quote.change),
        format!("{sign}{:.2}%", quote.change_percent),
    );
}
