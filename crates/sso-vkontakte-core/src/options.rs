// Plugin configuration.
//
// `SsoOptions` is fixed at startup (where the forum lives, which settings key
// to read, which cookie carries the session). `ProviderSettings` is what the
// admin edits at runtime: the Vkontakte app credentials and the auto-confirm
// flag.

use serde::{Deserialize, Deserializer, Serialize};

use crate::env;

/// Default settings key used by the admin panel.
pub const DEFAULT_SETTINGS_KEY: &str = "sso-vkontakte";

/// Default host session cookie.
pub const DEFAULT_SESSION_COOKIE: &str = "forum.sid";

/// Default forum URL when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4567";

/// Startup configuration for the plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsoOptions {
    /// Public URL of the forum (e.g. "https://forum.example.com").
    pub base_url: String,

    /// Settings key the admin panel saves under.
    #[serde(default = "default_settings_key")]
    pub settings_key: String,

    /// Name of the host session cookie.
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
}

fn default_settings_key() -> String {
    DEFAULT_SETTINGS_KEY.to_string()
}

fn default_session_cookie() -> String {
    DEFAULT_SESSION_COOKIE.to_string()
}

impl SsoOptions {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            settings_key: default_settings_key(),
            session_cookie: default_session_cookie(),
        }
    }

    /// Build options from the environment (`FORUM_URL`).
    pub fn from_env() -> Self {
        Self::new(env::get_url_from_env().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
    }

    /// Join a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl Default for SsoOptions {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Admin-editable provider settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Vkontakte application id.
    #[serde(default)]
    pub id: String,
    /// Vkontakte application secret.
    #[serde(default)]
    pub secret: String,
    /// Mark emails of linked accounts as confirmed.
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub autoconfirm: bool,
}

impl ProviderSettings {
    /// Whether both credentials are present.
    pub fn has_credentials(&self) -> bool {
        !self.id.trim().is_empty() && !self.secret.trim().is_empty()
    }
}

/// Accept the loose values form widgets store for checkboxes.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::String(s)) => {
            matches!(s.trim().to_lowercase().as_str(), "on" | "true" | "1")
        }
        Some(serde_json::Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    })
}
