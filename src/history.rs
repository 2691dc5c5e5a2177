use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::constants::HISTORY_POINTS;
use crate::feed::{FeedSubscription, PriceFeed};
use crate::quote::Quote;
use crate::sync::lock;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryPoint {
    /// Position of the snapshot this point came from, counted from attachment.
    pub seq: u64,
    pub price: f64,
}

/// Bounded per-symbol price trail for detail charts.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    max_points: usize,
    seq: u64,
    series: HashMap<String, VecDeque<HistoryPoint>>,
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new(HISTORY_POINTS)
    }
}

impl PriceHistory {
    pub fn new(max_points: usize) -> Self {
        Self {
            max_points,
            seq: 0,
            series: HashMap::new(),
        }
    }

    /// Record one snapshot, trimming each series to `max_points`.
    pub fn ingest(&mut self, quotes: &[Quote]) {
        let seq = self.seq;
        self.seq += 1;
        for quote in quotes {
            let entry = self.series.entry(quote.symbol.clone()).or_default();
            entry.push_back(HistoryPoint {
                seq,
                price: quote.price,
            });
            while entry.len() > self.max_points {
                entry.pop_front();
            }
        }
    }

    pub fn history_for(&self, symbol: &str) -> Option<&VecDeque<HistoryPoint>> {
        self.series.get(symbol)
    }

    pub fn latest(&self, symbol: &str) -> Option<HistoryPoint> {
        self.series.get(symbol)?.back().copied()
    }

    pub fn snapshots_seen(&self) -> u64 {
        self.seq
    }

    pub fn clear(&mut self) {
        self.seq = 0;
        self.series.clear();
    }

    /// Subscribe a fresh history to `feed`; the resting snapshot becomes its first point.
    pub fn attach(
        feed: &PriceFeed,
        max_points: usize,
    ) -> (Arc<Mutex<PriceHistory>>, FeedSubscription) {
        let history = Arc::new(Mutex::new(PriceHistory::new(max_points)));
        let sink = Arc::clone(&history);
        let subscription = feed.subscribe(move |quotes| lock(&sink).ingest(quotes));
        (history, subscription)
    }
}
