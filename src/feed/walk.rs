use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::constants::MAX_TICK_DELTA;
use crate::model::Instrument;
use crate::quote::Quote;

/// Source of per-instrument fractional price moves.
pub trait DeltaSource: Send {
    fn next_delta(&mut self) -> f64;
}

/// Uniform draw from `[-MAX_TICK_DELTA, MAX_TICK_DELTA]`.
pub struct UniformWalk<R = StdRng> {
    rng: R,
}

impl<R: Rng> UniformWalk<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl UniformWalk<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng + Send> DeltaSource for UniformWalk<R> {
    fn next_delta(&mut self) -> f64 {
        self.rng.gen_range(-MAX_TICK_DELTA..=MAX_TICK_DELTA)
    }
}

/// Current prices of a fixed universe plus the source driving them.
pub(crate) struct PriceBook {
    prices: Vec<f64>,
    source: Box<dyn DeltaSource>,
    ticks: u64,
}

impl PriceBook {
    pub(crate) fn new(universe: &[Instrument], source: Box<dyn DeltaSource>) -> Self {
        Self {
            prices: universe.iter().map(|instrument| instrument.seed_price).collect(),
            source,
            ticks: 0,
        }
    }

    pub(crate) fn ticks(&self) -> u64 {
        self.ticks
    }

    pub(crate) fn resting(&self, universe: &[Instrument]) -> Vec<Quote> {
        universe
            .iter()
            .zip(&self.prices)
            .map(|(instrument, price)| Quote::resting(instrument, *price))
            .collect()
    }

    /// Advance every price by one compounded step and return the new quotes.
    pub(crate) fn step(&mut self, universe: &[Instrument]) -> Vec<Quote> {
        let source = &mut self.source;
        let quotes = universe
            .iter()
            .zip(self.prices.iter_mut())
            .map(|(instrument, price)| {
                let delta = bounded(source.next_delta());
                let previous = *price;
                *price = previous * (1.0 + delta);
                // |delta| <= 0.005 keeps every finite walk strictly positive.
                debug_assert!(*price > 0.0, "{} price left the positive range", instrument.symbol);
                Quote {
                    symbol: instrument.symbol.clone(),
                    name: instrument.name.clone(),
                    price: *price,
                    change: *price - previous,
                    change_percent: delta * 100.0,
                }
            })
            .collect();

        self.ticks = self.ticks.saturating_add(1);
        quotes
    }
}

fn bounded(delta: f64) -> f64 {
    if delta.is_finite() {
        delta.clamp(-MAX_TICK_DELTA, MAX_TICK_DELTA)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::testkit::ScriptedDeltas;

    fn goog() -> Vec<Instrument> {
        vec![Instrument::new("GOOG", "Alphabet Inc.", 11_620.0)]
    }

    #[test]
    fn uniform_walk_stays_within_bounds() {
        let mut walk = UniformWalk::seeded(7);
        for _ in 0..10_000 {
            let delta = walk.next_delta();
            assert!((-MAX_TICK_DELTA..=MAX_TICK_DELTA).contains(&delta));
        }
    }

    #[test]
    fn step_applies_delta_to_previous_price() {
        let universe = goog();
        let mut book = PriceBook::new(&universe, Box::new(ScriptedDeltas::new([0.005])));

        let quotes = book.step(&universe);
        let quote = &quotes[0];
        assert!((quote.price - 11_678.10).abs() < 1e-6, "price {}", quote.price);
        assert!((quote.change - 58.10).abs() < 1e-6, "change {}", quote.change);
        assert!((quote.change_percent - 0.5).abs() < 1e-9);
        assert_eq!(book.ticks(), 1);
    }

    #[test]
    fn oversized_deltas_are_clamped() {
        let universe = goog();
        let mut book = PriceBook::new(
            &universe,
            Box::new(ScriptedDeltas::new([-3.0, f64::NAN])),
        );

        let first = book.step(&universe);
        assert!((first[0].change_percent + 0.5).abs() < 1e-9);
        let second = book.step(&universe);
        assert_eq!(second[0].change, 0.0);
        assert!(second[0].price > 0.0);
    }

    #[test]
    fn resting_view_reflects_latest_prices() {
        let universe = goog();
        let mut book = PriceBook::new(&universe, Box::new(ScriptedDeltas::new([0.001])));
        let stepped = book.step(&universe);
        let resting = book.resting(&universe);
        assert_eq!(resting[0].price, stepped[0].price);
        assert_eq!(resting[0].change, 0.0);
    }
}
