use std::path::Path;

use serde_json::json;

use crate::identity::{Identity, IdentityError, IdentityStore};
use crate::logging;
use crate::storage::{FileStore, MemoryStore, SharedStore, StorageError};
use crate::subscriptions::SubscriptionStore;

/// Identity and watchlist state bound to one storage backend.
///
/// The subscription store only exists inside a session wired to its identity
/// store, so neither can be queried without the other.
pub struct Session {
    store: SharedStore,
    identities: IdentityStore,
    subscriptions: SubscriptionStore,
}

impl Session {
    pub fn open(store: SharedStore) -> Self {
        let identities = IdentityStore::open(store.clone());
        let subscriptions = SubscriptionStore::new(store.clone(), &identities);
        Self {
            store,
            identities,
            subscriptions,
        }
    }

    pub fn in_memory() -> Self {
        Self::open(MemoryStore::shared())
    }

    pub fn open_dir(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        Ok(Self::open(FileStore::open_shared(dir)?))
    }

    pub fn identities(&self) -> &IdentityStore {
        &self.identities
    }

    pub fn subscriptions(&self) -> &SubscriptionStore {
        &self.subscriptions
    }

    pub fn current_user(&self) -> Option<Identity> {
        self.identities.current()
    }

    pub fn login(&self, email: &str) -> Result<Identity, IdentityError> {
        self.identities.login(email)
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        self.identities.logout()
    }

    pub fn toggle_subscription(&self, symbol: &str) -> Result<Option<bool>, StorageError> {
        self.subscriptions.toggle_subscription(symbol)
    }

    pub fn is_subscribed(&self, symbol: &str) -> bool {
        self.subscriptions.is_subscribed(symbol)
    }

    pub fn subscribed_symbols(&self) -> Vec<String> {
        self.subscriptions.subscribed_symbols()
    }

    /// Drop every stored identity and watchlist, then log out.
    pub fn reset_all_data(&self) -> Result<usize, StorageError> {
        let removed = self.store.clear_namespace()?;
        self.identities.logout()?;
        logging::info(
            "session.reset",
            "All local application data cleared",
            json!({ "keys_removed": removed }),
        );
        Ok(removed)
    }
}
