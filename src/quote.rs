use serde::{Deserialize, Serialize};

use crate::model::Instrument;

/// One instrument's price as delivered to feed observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl Quote {
    /// Quote with zeroed change fields.
    pub fn resting(instrument: &Instrument, price: f64) -> Self {
        Self {
            symbol: instrument.symbol.clone(),
            name: instrument.name.clone(),
            price,
            change: 0.0,
            change_percent: 0.0,
        }
    }

    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

/// Look a symbol up in a snapshot.
pub fn find<'a>(quotes: &'a [Quote], symbol: &str) -> Option<&'a Quote> {
    quotes.iter().find(|quote| quote.symbol == symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_uses_camel_case_on_the_wire() {
        let json = r#"{
            "symbol": "GOOG",
            "name": "Alphabet Inc.",
            "price": 11678.1,
            "change": 58.1,
            "changePercent": 0.5
        }"#;

        let quote: Quote = serde_json::from_str(json).expect("valid quote");
        assert_eq!(quote.symbol, "GOOG");
        assert_eq!(quote.change_percent, 0.5);
        assert!(quote.is_up());
    }

    #[test]
    fn resting_quote_has_no_change() {
        let instrument = Instrument::new("TSLA", "Tesla, Inc.", 20_750.0);
        let quote = Quote::resting(&instrument, 20_800.0);
        assert_eq!(quote.price, 20_800.0);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_percent, 0.0);
        assert_eq!(find(&[quote.clone()], "TSLA"), Some(&quote));
    }
}
