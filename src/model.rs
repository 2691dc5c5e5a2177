use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tickers of the reference deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Ticker {
    Goog,
    Tsla,
    Amzn,
    Meta,
    Nvda,
}

impl Ticker {
    pub const ALL: [Ticker; 5] = [
        Ticker::Goog,
        Ticker::Tsla,
        Ticker::Amzn,
        Ticker::Meta,
        Ticker::Nvda,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Ticker::Goog => "GOOG",
            Ticker::Tsla => "TSLA",
            Ticker::Amzn => "AMZN",
            Ticker::Meta => "META",
            Ticker::Nvda => "NVDA",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Ticker::Goog => "Alphabet Inc.",
            Ticker::Tsla => "Tesla, Inc.",
            Ticker::Amzn => "Amazon.com, Inc.",
            Ticker::Meta => "Meta Platforms, Inc.",
            Ticker::Nvda => "NVIDIA Corp.",
        }
    }

    /// Opening price of the walk, in INR.
    pub fn seed_price(self) -> f64 {
        match self {
            Ticker::Goog => 11_620.00,
            Ticker::Tsla => 20_750.00,
            Ticker::Amzn => 14_940.00,
            Ticker::Meta => 39_840.00,
            Ticker::Nvda => 74_700.00,
        }
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Ticker {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ticker::ALL
            .into_iter()
            .find(|ticker| ticker.symbol().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown ticker {value:?}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub seed_price: f64,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, seed_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            seed_price,
        }
    }
}

impl From<Ticker> for Instrument {
    fn from(ticker: Ticker) -> Self {
        Instrument::new(ticker.symbol(), ticker.name(), ticker.seed_price())
    }
}

pub fn default_universe() -> Vec<Instrument> {
    Ticker::ALL.into_iter().map(Instrument::from).collect()
}

/// Display name for a symbol; unknown symbols are their own label.
pub fn display_name(symbol: &str) -> &str {
    Ticker::ALL
        .into_iter()
        .find(|ticker| ticker.symbol() == symbol)
        .map(Ticker::name)
        .unwrap_or(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_universe_matches_ticker_table() {
        let universe = default_universe();
        assert_eq!(universe.len(), Ticker::ALL.len());
        assert_eq!(universe[0], Instrument::new("GOOG", "Alphabet Inc.", 11_620.0));
        assert!(universe.iter().all(|instrument| instrument.seed_price > 0.0));
    }

    #[test]
    fn display_name_falls_back_to_symbol() {
        assert_eq!(display_name("NVDA"), "NVIDIA Corp.");
        assert_eq!(display_name("IBM"), "IBM");
    }

    #[test]
    fn tickers_parse_case_insensitively() {
        assert_eq!("tsla".parse::<Ticker>(), Ok(Ticker::Tsla));
        assert!("XYZ".parse::<Ticker>().is_err());
    }
}
