use anyhow::{bail, Result};
use clap::Args;
use textplots::{Chart, Plot, Shape};
use tokio::signal;
use tokio::sync::mpsc;

use crate::cli::FeedArgs;
use crate::constants::HISTORY_POINTS;
use crate::feed::PriceFeed;
use crate::history::{HistoryPoint, PriceHistory};
use crate::logging;
use crate::model::Ticker;
use crate::sync::lock;

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Symbol to plot
    #[arg(short, long)]
    pub symbol: Ticker,

    /// Number of ticks to collect before plotting
    #[arg(short, long, default_value_t = HISTORY_POINTS)]
    pub ticks: usize,

    /// Chart width in characters
    #[arg(long, default_value_t = 120)]
    pub width: u32,

    /// Chart height in characters
    #[arg(long, default_value_t = 30)]
    pub height: u32,

    #[command(flatten)]
    pub feed: FeedArgs,
}

pub async fn run(args: ChartArgs) -> Result<()> {
    let config = args.feed.config();
    let feed = PriceFeed::from_config(&config);
    let (history, recorder) = PriceHistory::attach(&feed, args.ticks + 1);

    let (tx, mut rx) = mpsc::unbounded_channel::<()>();
    let progress = feed.subscribe(move |_| {
        let _ = tx.send(());
    });
    // Swallow the resting snapshot every subscriber gets on registration.
    rx.recv().await;

    println!(
        "Collecting {} ticks of {} every {}ms...",
        args.ticks,
        args.symbol,
        config.tick_interval.as_millis()
    );
    feed.start(config.tick_interval);

    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut collected = 0usize;
    while collected < args.ticks {
        tokio::select! {
            received = rx.recv() => {
                if received.is_none() {
                    break;
                }
                collected += 1;
            }
            _ = &mut shutdown => {
                logging::info_simple("chart.interrupt", "Interrupted; plotting what was collected");
                break;
            }
        }
    }

    feed.stop().await;
    progress.unsubscribe();
    recorder.unsubscribe();

    let points: Vec<HistoryPoint> = lock(&history)
        .history_for(args.symbol.symbol())
        .map(|series| series.iter().copied().collect())
        .unwrap_or_default();
    if points.len() < 2 {
        bail!("not enough data points to render a chart");
    }

    render_chart(args.symbol, &points, args.width, args.height);
    Ok(())
}

fn render_chart(ticker: Ticker, points: &[HistoryPoint], width: u32, height: u32) {
    println!(
        "Rendering chart for {} ({}, {} samples)",
        ticker,
        ticker.name(),
        points.len()
    );

    let (min_price, max_price) = price_range(points);
    println!("Price range: {:.2} → {:.2}", min_price, max_price);

    let samples: Vec<(f32, f32)> = points
        .iter()
        .map(|point| (point.seq as f32, point.price as f32))
        .collect();
    let max_seq = points.last().map(|point| point.seq).unwrap_or(1).max(1);

    Chart::new(width.max(40), height.max(10), 0.0, max_seq as f32)
        .lineplot(&Shape::Lines(&samples))
        .display();
    println!();
}

fn price_range(points: &[HistoryPoint]) -> (f64, f64) {
    points.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(low, high), point| (low.min(point.price), high.max(point.price)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_range_spans_all_points() {
        let points = [
            HistoryPoint { seq: 0, price: 10.0 },
            HistoryPoint { seq: 1, price: 12.5 },
            HistoryPoint { seq: 2, price: 9.75 },
        ];
        assert_eq!(price_range(&points), (9.75, 12.5));
    }
}
