// Plugin context — the collaborators every component works against.
//
// Built once at startup and shared as `Arc<SsoContext>`.

use std::sync::Arc;

use sso_vkontakte_core::options::SsoOptions;
use sso_vkontakte_core::store::{ObjectStore, SessionStore, SettingsStore, UserStore};

use crate::settings::SettingsCache;

pub struct SsoContext {
    /// Startup options.
    pub options: SsoOptions,

    /// Host user records.
    pub users: Arc<dyn UserStore>,

    /// Host key-value store holding the linkage map.
    pub objects: Arc<dyn ObjectStore>,

    /// Host session machinery.
    pub sessions: Arc<dyn SessionStore>,

    /// Lazily loaded provider settings.
    pub settings: SettingsCache,
}

impl std::fmt::Debug for SsoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SsoContext")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SsoContext {
    pub fn new(
        options: SsoOptions,
        users: Arc<dyn UserStore>,
        objects: Arc<dyn ObjectStore>,
        settings: Arc<dyn SettingsStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Arc<Self> {
        let settings = SettingsCache::new(settings, options.settings_key.clone());
        Arc::new(Self {
            options,
            users,
            objects,
            sessions,
            settings,
        })
    }
}
