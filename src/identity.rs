use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::sync::watch;

use crate::logging;
use crate::storage::{identity_key, read_json, write_json, SharedStore, StorageError};

/// Locally recorded user. The email doubles as the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

impl Identity {
    pub fn from_email(email: &str) -> Result<Self, IdentityError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(IdentityError::EmptyEmail);
        }
        Ok(Self {
            id: email.to_string(),
            email: email.to_string(),
        })
    }

    fn is_well_formed(&self) -> bool {
        !self.id.is_empty() && self.id == self.email
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("email must not be empty")]
    EmptyEmail,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Single-slot active identity, persisted across restarts.
pub struct IdentityStore {
    store: SharedStore,
    active: watch::Sender<Option<Identity>>,
}

impl IdentityStore {
    /// Open the store and restore a previously persisted identity, if any.
    pub fn open(store: SharedStore) -> Self {
        let restored = read_json::<Identity>(store.as_ref(), &identity_key()).filter(|identity| {
            let ok = identity.is_well_formed();
            if !ok {
                logging::warn_simple(
                    "identity.malformed",
                    "Stored identity failed validation; starting logged out",
                );
            }
            ok
        });

        if let Some(identity) = &restored {
            logging::info(
                "identity.restore",
                "Restored persisted identity",
                json!({ "id": identity.id }),
            );
        }

        let (active, _) = watch::channel(restored);
        Self { store, active }
    }

    pub fn current(&self) -> Option<Identity> {
        self.active.borrow().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.active.borrow().is_some()
    }

    /// Receiver that observes every login and logout.
    pub fn watch(&self) -> watch::Receiver<Option<Identity>> {
        self.active.subscribe()
    }

    /// Persist `email` as the active identity, replacing any previous one.
    pub fn login(&self, email: &str) -> Result<Identity, IdentityError> {
        let identity = Identity::from_email(email)?;
        write_json(self.store.as_ref(), &identity_key(), &identity)?;
        self.active.send_replace(Some(identity.clone()));

        logging::info(
            "identity.login",
            "Identity logged in",
            json!({ "id": identity.id }),
        );
        Ok(identity)
    }

    /// Forget the active identity. Subscription data is left in place.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.store.remove(&identity_key())?;
        if let Some(previous) = self.active.send_replace(None) {
            logging::info(
                "identity.logout",
                "Identity logged out",
                json!({ "id": previous.id }),
            );
        }
        Ok(())
    }
}
