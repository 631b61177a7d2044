use std::sync::Arc;

use crate::error::Result;
use crate::models::User;

use super::KeyValueStore;

pub const USER_KEY: &str = "yt-summarizer-user";

/// Local mock login. Owns the user slot in storage.
pub struct Session {
    storage: Arc<dyn KeyValueStore>,
    user: Option<User>,
}

impl Session {
    pub async fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let user = match storage.get(USER_KEY).await {
            Ok(Some(raw)) => serde_json::from_str::<User>(&raw)
                .map_err(|e| tracing::warn!("Ignoring unreadable session: {}", e))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to load session: {}", e);
                None
            }
        };

        Self { storage, user }
    }

    pub fn current(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    pub async fn login(&mut self, email: &str) -> Result<&User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(anyhow::anyhow!("An email address is required to log in").into());
        }

        let user = User::mock(email);
        self.storage
            .set(USER_KEY, serde_json::to_string(&user)?)
            .await?;
        tracing::info!("Logged in as {}", user.email);

        Ok(self.user.insert(user))
    }

    pub async fn logout(&mut self) -> Result<()> {
        self.storage.remove(USER_KEY).await?;
        self.user = None;
        Ok(())
    }
}
