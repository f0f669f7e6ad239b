// In-memory host session store.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use sso_vkontakte_core::error::StoreError;
use sso_vkontakte_core::models::AccountId;
use sso_vkontakte_core::store::SessionStore;

use crate::faults::Faults;

#[derive(Debug, Default)]
struct Sessions {
    tokens: HashMap<String, AccountId>,
    admins: HashSet<AccountId>,
}

/// Session tokens are random UUIDs; nothing expires.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<Sessions>>,
    faults: Faults,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: Faults) -> Self {
        Self {
            sessions: Arc::default(),
            faults,
        }
    }

    /// Allow `uid` into the admin panel.
    pub async fn grant_admin(&self, uid: AccountId) {
        self.sessions.write().await.admins.insert(uid);
    }

    /// Number of live sessions bound to `uid`.
    pub async fn sessions_for(&self, uid: AccountId) -> usize {
        self.sessions
            .read()
            .await
            .tokens
            .values()
            .filter(|owner| **owner == uid)
            .count()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn current_uid(&self, token: &str) -> Result<Option<AccountId>, StoreError> {
        self.faults.check("current_uid").await?;
        Ok(self.sessions.read().await.tokens.get(token).copied())
    }

    async fn is_admin(&self, uid: AccountId) -> Result<bool, StoreError> {
        self.faults.check("is_admin").await?;
        Ok(self.sessions.read().await.admins.contains(&uid))
    }

    async fn on_successful_login(&self, uid: AccountId) -> Result<String, StoreError> {
        self.faults.check("on_successful_login").await?;
        let token = uuid::Uuid::new_v4().to_string();
        self.sessions.write().await.tokens.insert(token.clone(), uid);
        Ok(token)
    }
}
