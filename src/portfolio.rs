use serde::Serialize;

use crate::model::Ticker;
use crate::quote::{self, Quote};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Holding {
    pub symbol: String,
    pub shares: u32,
    pub avg_cost: f64,
}

impl Holding {
    /// Synthetic position for a watched symbol.
    pub fn mock(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            shares: symbol.chars().count() as u32 * 10,
            avg_cost: mock_avg_cost(symbol),
        }
    }
}

fn mock_avg_cost(symbol: &str) -> f64 {
    match symbol.parse::<Ticker>() {
        Ok(Ticker::Goog) => 11_200.0,
        Ok(Ticker::Tsla) => 19_500.0,
        Ok(Ticker::Amzn) => 14_000.0,
        Ok(Ticker::Nvda) => 72_000.0,
        Ok(Ticker::Meta) | Err(_) => 38_000.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub symbol: String,
    pub shares: u32,
    pub avg_cost: f64,
    pub current_price: f64,
    pub current_value: f64,
    pub cost_basis: f64,
    pub pl: f64,
    pub pl_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    pub positions: Vec<Position>,
    pub total_value: f64,
}

impl Valuation {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    pub fn from_watchlist<I, S>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            holdings: symbols
                .into_iter()
                .map(|symbol| Holding::mock(symbol.as_ref()))
                .collect(),
        }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Value every holding at the snapshot's prices; symbols missing from the
    /// snapshot are carried at cost.
    pub fn value(&self, quotes: &[Quote]) -> Valuation {
        let positions: Vec<Position> = self
            .holdings
            .iter()
            .map(|holding| {
                let current_price = quote::find(quotes, &holding.symbol)
                    .map(|quote| quote.price)
                    .unwrap_or(holding.avg_cost);
                let shares = f64::from(holding.shares);
                let current_value = shares * current_price;
                let cost_basis = shares * holding.avg_cost;
                let pl = current_value - cost_basis;
                let pl_percent = if cost_basis > 0.0 {
                    pl / cost_basis * 100.0
                } else {
                    0.0
                };

                Position {
                    symbol: holding.symbol.clone(),
                    shares: holding.shares,
                    avg_cost: holding.avg_cost,
                    current_price,
                    current_value,
                    cost_basis,
                    pl,
                    pl_percent,
                }
            })
            .collect();

        let total_value = positions.iter().map(|position| position.current_value).sum();
        Valuation {
            positions,
            total_value,
        }
    }
}
