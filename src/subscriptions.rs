use std::sync::Mutex;

use indexmap::IndexSet;
use serde_json::json;
use tokio::sync::watch;

use crate::identity::{Identity, IdentityStore};
use crate::logging;
use crate::quote::Quote;
use crate::storage::{read_json, subscriptions_key, write_json, SharedStore, StorageError};
use crate::sync::lock;

/// Watchlist of the active identity.
///
/// The visible set follows the identity store: whenever the active identity
/// changes the set is reloaded from storage for the new owner, or emptied
/// when nobody is logged in. Other identities' sets stay in storage untouched
/// and are never readable through this store.
pub struct SubscriptionStore {
    store: SharedStore,
    state: Mutex<ActiveSet>,
}

struct ActiveSet {
    identity: watch::Receiver<Option<Identity>>,
    owner: Option<String>,
    symbols: IndexSet<String>,
}

impl ActiveSet {
    /// Re-derive the set if the active identity moved since the last look.
    fn sync(&mut self, store: &SharedStore) {
        let changed = self.identity.has_changed().unwrap_or(false);
        let current = self
            .identity
            .borrow_and_update()
            .as_ref()
            .map(|identity| identity.id.clone());

        if changed || current != self.owner {
            self.symbols = load_symbols(store, current.as_deref());
            self.owner = current;
        }
    }
}

fn load_symbols(store: &SharedStore, owner: Option<&str>) -> IndexSet<String> {
    let Some(owner) = owner else {
        return IndexSet::new();
    };

    let symbols: IndexSet<String> =
        read_json::<Vec<String>>(store.as_ref(), &subscriptions_key(owner))
            .unwrap_or_default()
            .into_iter()
            .collect();
    logging::info(
        "subscriptions.load",
        "Loaded watchlist for active identity",
        json!({ "id": owner, "symbols": symbols.len() }),
    );
    symbols
}

impl SubscriptionStore {
    pub fn new(store: SharedStore, identities: &IdentityStore) -> Self {
        let mut identity = identities.watch();
        let owner = identity
            .borrow_and_update()
            .as_ref()
            .map(|identity| identity.id.clone());
        let symbols = load_symbols(&store, owner.as_deref());

        Self {
            store,
            state: Mutex::new(ActiveSet {
                identity,
                owner,
                symbols,
            }),
        }
    }

    /// Flip membership of `symbol` and persist before returning.
    ///
    /// Returns the new membership, or `None` without touching storage when
    /// no identity is active.
    pub fn toggle_subscription(&self, symbol: &str) -> Result<Option<bool>, StorageError> {
        let mut state = lock(&self.state);
        state.sync(&self.store);
        let Some(owner) = state.owner.clone() else {
            return Ok(None);
        };

        let mut next = state.symbols.clone();
        let subscribed = if next.shift_remove(symbol) {
            false
        } else {
            next.insert(symbol.to_string());
            true
        };

        let ordered: Vec<&String> = next.iter().collect();
        write_json(self.store.as_ref(), &subscriptions_key(&owner), &ordered)?;
        state.symbols = next;

        logging::info(
            "subscriptions.toggle",
            "Watchlist updated",
            json!({ "id": owner, "symbol": symbol, "subscribed": subscribed }),
        );
        Ok(Some(subscribed))
    }

    pub fn is_subscribed(&self, symbol: &str) -> bool {
        let mut state = lock(&self.state);
        state.sync(&self.store);
        state.symbols.contains(symbol)
    }

    /// Watched symbols in the order they were added.
    pub fn subscribed_symbols(&self) -> Vec<String> {
        let mut state = lock(&self.state);
        state.sync(&self.store);
        state.symbols.iter().cloned().collect()
    }

    /// Quotes for watched symbols, in feed order.
    pub fn filter_quotes(&self, quotes: &[Quote]) -> Vec<Quote> {
        let mut state = lock(&self.state);
        state.sync(&self.store);
        quotes
            .iter()
            .filter(|quote| state.symbols.contains(&quote.symbol))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn wired() -> (SharedStore, IdentityStore, SubscriptionStore) {
        let store = MemoryStore::shared();
        let identities = IdentityStore::open(store.clone());
        let subscriptions = SubscriptionStore::new(store.clone(), &identities);
        (store, identities, subscriptions)
    }

    #[test]
    fn toggle_twice_restores_membership() {
        let (_, identities, subscriptions) = wired();
        identities.login("a@x.com").unwrap();

        assert_eq!(subscriptions.toggle_subscription("GOOG").unwrap(), Some(true));
        assert!(subscriptions.is_subscribed("GOOG"));
        assert_eq!(subscriptions.toggle_subscription("GOOG").unwrap(), Some(false));
        assert!(!subscriptions.is_subscribed("GOOG"));
    }

    #[test]
    fn toggle_without_identity_is_a_noop() {
        let (store, _, subscriptions) = wired();
        let before = store.keys();

        assert_eq!(subscriptions.toggle_subscription("TSLA").unwrap(), None);

        assert_eq!(store.keys(), before);
        assert!(!subscriptions.is_subscribed("TSLA"));
    }

    #[test]
    fn toggle_writes_through_immediately() {
        let (store, identities, subscriptions) = wired();
        identities.login("a@x.com").unwrap();

        subscriptions.toggle_subscription("TSLA").unwrap();
        subscriptions.toggle_subscription("GOOG").unwrap();

        let stored: Option<Vec<String>> = read_json(store.as_ref(), &subscriptions_key("a@x.com"));
        assert_eq!(stored, Some(vec!["TSLA".to_string(), "GOOG".to_string()]));
    }

    #[test]
    fn identities_are_isolated() {
        let (_, identities, subscriptions) = wired();
        identities.login("a@x.com").unwrap();
        subscriptions.toggle_subscription("GOOG").unwrap();

        identities.login("b@x.com").unwrap();
        assert!(subscriptions.subscribed_symbols().is_empty());
        subscriptions.toggle_subscription("NVDA").unwrap();

        identities.login("a@x.com").unwrap();
        assert_eq!(subscriptions.subscribed_symbols(), vec!["GOOG".to_string()]);
        assert!(!subscriptions.is_subscribed("NVDA"));
    }

    #[test]
    fn logout_hides_but_keeps_stored_set() {
        let (store, identities, subscriptions) = wired();
        identities.login("a@x.com").unwrap();
        subscriptions.toggle_subscription("AMZN").unwrap();

        identities.logout().unwrap();

        assert!(subscriptions.subscribed_symbols().is_empty());
        assert!(store.get(&subscriptions_key("a@x.com")).is_some());
    }

    #[test]
    fn restored_identity_loads_its_set() {
        let store = MemoryStore::shared();
        {
            let identities = IdentityStore::open(store.clone());
            let subscriptions = SubscriptionStore::new(store.clone(), &identities);
            identities.login("a@x.com").unwrap();
            subscriptions.toggle_subscription("META").unwrap();
        }

        let identities = IdentityStore::open(store.clone());
        let subscriptions = SubscriptionStore::new(store, &identities);
        assert!(subscriptions.is_subscribed("META"));
    }

    #[test]
    fn malformed_set_reads_as_empty() {
        let store = MemoryStore::shared();
        store.set(&subscriptions_key("a@x.com"), "{\"oops\":1}").unwrap();
        let identities = IdentityStore::open(store.clone());
        let subscriptions = SubscriptionStore::new(store, &identities);

        identities.login("a@x.com").unwrap();

        assert!(subscriptions.subscribed_symbols().is_empty());
        assert_eq!(subscriptions.toggle_subscription("GOOG").unwrap(), Some(true));
    }

    #[test]
    fn filter_quotes_keeps_feed_order() {
        let (_, identities, subscriptions) = wired();
        identities.login("a@x.com").unwrap();
        subscriptions.toggle_subscription("NVDA").unwrap();
        subscriptions.toggle_subscription("GOOG").unwrap();

        let quotes: Vec<Quote> = crate::model::default_universe()
            .iter()
            .map(|instrument| Quote::resting(instrument, instrument.seed_price))
            .collect();
        let symbols: Vec<String> = subscriptions
            .filter_quotes(&quotes)
            .into_iter()
            .map(|quote| quote.symbol)
            .collect();

        assert_eq!(symbols, vec!["GOOG".to_string(), "NVDA".to_string()]);
    }
}
