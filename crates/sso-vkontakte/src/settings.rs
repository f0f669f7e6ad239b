// Settings cache — lazily loaded provider settings.
//
// The first `get` reads the settings store; later calls reuse the cached
// copy. Concurrent first loads wait on one fetch. A failed load is logged and
// yields empty settings without caching, so the next call tries again.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use sso_vkontakte_core::error::{Result, StoreError};
use sso_vkontakte_core::options::ProviderSettings;
use sso_vkontakte_core::store::SettingsStore;

#[derive(Debug)]
pub struct SettingsCache {
    store: Arc<dyn SettingsStore>,
    key: String,
    cached: RwLock<Option<Arc<ProviderSettings>>>,
    /// Single-flight guard for loads.
    loading: Mutex<()>,
}

impl SettingsCache {
    pub fn new(store: Arc<dyn SettingsStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            cached: RwLock::new(None),
            loading: Mutex::new(()),
        }
    }

    /// The settings key this cache reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current settings, loading them on first use.
    pub async fn get(&self) -> Arc<ProviderSettings> {
        if let Some(settings) = self.cached.read().await.as_ref() {
            return settings.clone();
        }

        let _guard = self.loading.lock().await;
        // Another task may have finished the load while we waited.
        if let Some(settings) = self.cached.read().await.as_ref() {
            return settings.clone();
        }

        match self.load().await {
            Ok(settings) => {
                let settings = Arc::new(settings);
                *self.cached.write().await = Some(settings.clone());
                settings
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Could not load settings");
                Arc::new(ProviderSettings::default())
            }
        }
    }

    /// Drop the cached copy; the next `get` reloads.
    ///
    /// Waits for an in-flight load so it cannot repopulate the cache afterwards.
    pub async fn invalidate(&self) {
        let _guard = self.loading.lock().await;
        *self.cached.write().await = None;
    }

    /// Persist new settings and drop the cached copy.
    pub async fn save(&self, settings: &ProviderSettings) -> Result<()> {
        let value = serde_json::to_value(settings).map_err(StoreError::from)?;
        // Held across the write so a load that read the old value finishes first.
        let _guard = self.loading.lock().await;
        self.store.set(&self.key, value).await?;
        *self.cached.write().await = None;
        tracing::info!(key = %self.key, "Settings saved");
        Ok(())
    }

    async fn load(&self) -> std::result::Result<ProviderSettings, StoreError> {
        match self.store.get(&self.key).await? {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(ProviderSettings::default()),
        }
    }
}
