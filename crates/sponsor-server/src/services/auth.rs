//! Telegram login bootstrap

use sponsor_core::{Result, Storage, StorageError, TelegramAuth, User};
use std::sync::Arc;
use tracing::{debug, info};

pub struct AuthService {
    storage: Arc<dyn Storage>,
    admin_telegram_id: Option<String>,
}

impl AuthService {
    pub fn new(storage: Arc<dyn Storage>, admin_telegram_id: Option<String>) -> Self {
        Self {
            storage,
            admin_telegram_id,
        }
    }

    fn is_admin(&self, telegram_id: &str) -> bool {
        self.admin_telegram_id.as_deref() == Some(telegram_id)
    }

    /// Find the user for a Telegram identity, creating it on first login.
    ///
    /// The stored record is returned as-is on later logins; profile changes
    /// go through `update_user`.
    pub async fn authenticate(&self, identity: TelegramAuth) -> Result<User> {
        if let Some(user) = self
            .storage
            .get_user_by_telegram_id(&identity.telegram_id)
            .await?
        {
            debug!("Known telegram user {} -> user {}", user.telegram_id, user.id);
            return Ok(user);
        }

        let telegram_id = identity.telegram_id.clone();
        let is_admin = self.is_admin(&telegram_id);
        match self.storage.create_user(identity.into_new_user(is_admin)).await {
            Ok(user) => {
                info!(
                    "Registered telegram user {} as user {} (admin: {})",
                    telegram_id, user.id, user.is_admin
                );
                Ok(user)
            }
            // lost a race with a concurrent first login
            Err(StorageError::Duplicate { .. }) => self
                .storage
                .get_user_by_telegram_id(&telegram_id)
                .await?
                .ok_or_else(|| StorageError::Database(format!(
                    "telegram user {} vanished after duplicate insert",
                    telegram_id
                ))),
            Err(e) => Err(e),
        }
    }
}
