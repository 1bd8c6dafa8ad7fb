//! Logged-in user state.
//!
//! [`AppState`] is handed to every command instead of living in a global.
//! Where it is persisted is the [`SessionStore`]'s business.

use std::future::Future;

use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::api::UserProfile;
use crate::storage::StorageError;

/// Persistence port for the current session.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> impl Future<Output = Result<Option<UserProfile>, StorageError>> + Send;

    fn save(&self, profile: &UserProfile)
    -> impl Future<Output = Result<(), StorageError>> + Send;

    fn clear(&self) -> impl Future<Output = Result<(), StorageError>> + Send;
}

pub struct AppState<S> {
    store: S,
    user: Option<UserProfile>,
}

impl<S: SessionStore> AppState<S> {
    /// Restores whatever session the store holds. An unreadable session is
    /// logged and treated as logged out.
    pub async fn restore(store: S) -> Result<Self, StorageError> {
        let user = match store.load().await {
            Ok(user) => user,
            Err(StorageError::Corrupt(e)) => {
                warn!(error = %e, "discarding unreadable session");
                store.clear().await?;
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self { store, user })
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn require_user(&self) -> Result<&UserProfile> {
        self.user
            .as_ref()
            .ok_or_else(|| anyhow!("Not logged in. Run `stylefeed login` first."))
    }

    pub async fn login(&mut self, profile: UserProfile) -> Result<(), StorageError> {
        self.store.save(&profile).await?;
        info!(user = %profile.username, "logged in");
        self.user = Some(profile);
        Ok(())
    }

    pub async fn logout(&mut self) -> Result<(), StorageError> {
        self.store.clear().await?;
        if let Some(user) = self.user.take() {
            info!(user = %user.username, "logged out");
        }
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemorySessionStore;
