use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::quote::Quote;

const BASE_CONFIDENCE: f64 = 75.0;
const TREND_BOOST_CAP: f64 = 20.0;
const JITTER_SPAN: f64 = 5.0;
const MAX_CONFIDENCE: f64 = 99.0;
const STRONG_MOVE_PERCENT: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sentiment {
    Bullish,
    NeutralBullish,
    Neutral,
    Bearish,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Sentiment::Bullish => "bullish",
            Sentiment::NeutralBullish => "neutral-bullish",
            Sentiment::Neutral => "neutral",
            Sentiment::Bearish => "bearish",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub symbol: String,
    pub text: &'static str,
    pub sentiment: Sentiment,
    /// Percentage in `0..=99`.
    pub confidence: u8,
}

/// Canned trading commentary for the last tick of a quote.
pub struct InsightGenerator<R = StdRng> {
    rng: R,
}

impl InsightGenerator<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> InsightGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn insight_for(&mut self, quote: &Quote) -> Insight {
        let (text, sentiment) = classify(quote.change_percent);
        let jitter = self.rng.gen_range(-JITTER_SPAN / 2.0..JITTER_SPAN / 2.0);
        Insight {
            symbol: quote.symbol.clone(),
            text,
            sentiment,
            confidence: confidence(quote.change_percent, jitter),
        }
    }
}

fn classify(change_percent: f64) -> (&'static str, Sentiment) {
    if change_percent > STRONG_MOVE_PERCENT {
        (
            "Strong Buy Signal! Momentum is building up rapidly.",
            Sentiment::Bullish,
        )
    } else if change_percent > 0.0 {
        (
            "Moderate Growth. Good for long-term holding.",
            Sentiment::NeutralBullish,
        )
    } else if change_percent < -STRONG_MOVE_PERCENT {
        (
            "Oversold conditions detected. Watch for a bounce.",
            Sentiment::Bearish,
        )
    } else {
        (
            "Market is consolidating. Wait for a breakout.",
            Sentiment::Neutral,
        )
    }
}

// Stronger moves read as higher conviction.
fn confidence(change_percent: f64, jitter: f64) -> u8 {
    let boost = (change_percent.abs() * 100.0).min(TREND_BOOST_CAP);
    (BASE_CONFIDENCE + boost + jitter)
        .floor()
        .clamp(0.0, MAX_CONFIDENCE) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_with(change_percent: f64) -> Quote {
        Quote {
            symbol: "GOOG".into(),
            name: "Alphabet Inc.".into(),
            price: 11_620.0,
            change: 0.0,
            change_percent,
        }
    }

    #[test]
    fn thresholds_pick_sentiment() {
        assert_eq!(classify(0.45).1, Sentiment::Bullish);
        assert_eq!(classify(0.3).1, Sentiment::NeutralBullish);
        assert_eq!(classify(0.01).1, Sentiment::NeutralBullish);
        assert_eq!(classify(0.0).1, Sentiment::Neutral);
        assert_eq!(classify(-0.3).1, Sentiment::Neutral);
        assert_eq!(classify(-0.31).1, Sentiment::Bearish);
    }

    #[test]
    fn confidence_caps_trend_boost() {
        assert_eq!(confidence(0.0, 0.0), 75);
        assert_eq!(confidence(0.1, 0.0), 85);
        assert_eq!(confidence(0.5, 0.0), 95);
        assert_eq!(confidence(-0.5, 2.4), 97);
        assert_eq!(confidence(0.0, -2.5), 72);
    }

    #[test]
    fn confidence_stays_in_range() {
        let mut generator = InsightGenerator::seeded(17);
        for step in -50..=50 {
            let insight = generator.insight_for(&quote_with(step as f64 / 100.0));
            assert!((72..=97).contains(&insight.confidence), "{}", insight.confidence);
        }
    }

    #[test]
    fn seeded_generators_agree() {
        let quote = quote_with(0.2);
        let first = InsightGenerator::seeded(5).insight_for(&quote);
        let second = InsightGenerator::seeded(5).insight_for(&quote);
        assert_eq!(first, second);
        assert_eq!(first.sentiment.to_string(), "neutral-bullish");
    }
}
