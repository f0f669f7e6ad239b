// Admin panel: settings page, JSON view, settings save and the menu entry.

use serde::{Deserialize, Serialize};

use sso_vkontakte_core::error::Result;
use sso_vkontakte_core::models::MenuItem;
use sso_vkontakte_core::options::ProviderSettings;

use crate::constants;
use crate::settings::SettingsCache;

/// The admin navigation entry.
pub fn menu_item() -> MenuItem {
    MenuItem {
        route: constants::ADMIN_MENU_ROUTE.to_string(),
        icon: constants::PROVIDER_ICON.to_string(),
        name: constants::PROVIDER_NAME.to_string(),
    }
}

/// What the admin JSON view exposes. The secret is never echoed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminView {
    pub settings: AdminSettingsView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminSettingsView {
    pub id: String,
    pub autoconfirm: bool,
    /// Whether a secret is stored.
    #[serde(rename = "hasSecret")]
    pub has_secret: bool,
}

impl AdminView {
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self {
            settings: AdminSettingsView {
                id: settings.id.clone(),
                autoconfirm: settings.autoconfirm,
                has_secret: !settings.secret.trim().is_empty(),
            },
        }
    }
}

/// A settings save from the admin form.
///
/// An empty or missing secret keeps the stored one, since the form never
/// receives it back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub autoconfirm: Option<serde_json::Value>,
}

impl SettingsUpdate {
    fn apply(self, current: &ProviderSettings) -> Result<ProviderSettings> {
        let secret = self
            .secret
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| current.secret.clone());
        let raw = serde_json::json!({
            "id": self.id.trim(),
            "secret": secret,
            "autoconfirm": self.autoconfirm,
        });
        serde_json::from_value(raw)
            .map_err(|e| sso_vkontakte_core::error::StoreError::from(e).into())
    }
}

/// Persist a settings save; the strategy picks it up on its next lookup.
pub async fn save_settings(cache: &SettingsCache, update: SettingsUpdate) -> Result<ProviderSettings> {
    let current = cache.get().await;
    let settings = update.apply(&current)?;
    cache.save(&settings).await?;
    Ok(settings)
}

/// Render the settings form.
pub fn render_admin_page(settings: &ProviderSettings) -> String {
    let checked = if settings.autoconfirm { " checked" } else { "" };
    let secret_hint = if settings.secret.trim().is_empty() {
        "Client Secret"
    } else {
        "Leave blank to keep the current secret"
    };
    format!(
        r#"<div class="row">
  <div class="col-sm-2 col-xs-12 settings-header">{name} Social Authentication</div>
  <div class="col-sm-10 col-xs-12">
    <div class="alert alert-info">
      Create an application at <a href="https://vk.com/apps?act=manage">vk.com/apps</a>
      and set its redirect URI to <code>{callback}</code>.
    </div>
    <form role="form" class="{plugin}-settings" method="post" action="{api}">
      <div class="form-group">
        <label for="id">Application ID</label>
        <input type="text" id="id" name="id" title="Application ID" class="form-control" placeholder="Application ID" value="{id}">
      </div>
      <div class="form-group">
        <label for="secret">Secure key</label>
        <input type="password" id="secret" name="secret" title="Secure key" class="form-control" placeholder="{secret_hint}">
      </div>
      <div class="checkbox">
        <label for="autoconfirm">
          <input type="checkbox" id="autoconfirm" name="autoconfirm"{checked}>
          Skip email verification for people who register using SSO?
        </label>
      </div>
      <button type="submit" class="btn btn-primary" id="save">Save Settings</button>
    </form>
    <p class="help-block">Reload the forum after saving to apply new credentials.</p>
  </div>
</div>
"#,
        name = constants::PROVIDER_NAME,
        plugin = escape_html(constants::PROVIDER_ID),
        callback = escape_html(constants::CALLBACK_PATH),
        api = constants::ADMIN_API_PATH,
        id = escape_html(&settings.id),
        secret_hint = secret_hint,
        checked = checked,
    )
}

/// Escape text for HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
