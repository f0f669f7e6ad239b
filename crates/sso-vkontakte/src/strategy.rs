// Strategy registration and the OAuth verify callback.

use std::sync::Arc;

use sso_vkontakte_core::error::Result;
use sso_vkontakte_core::models::{
    AccountId, OAuthTokens, ProviderIdentity, ProviderProfile, StrategyConfig, StrategyDescriptor,
};

use crate::constants;
use crate::context::SsoContext;
use crate::linker::{IdentityLinker, LinkOutcome};

/// The public login-page entry for Vkontakte.
pub fn descriptor() -> StrategyDescriptor {
    StrategyDescriptor {
        name: constants::PROVIDER_ID.to_string(),
        url: constants::AUTH_PATH.to_string(),
        callback_url: constants::CALLBACK_PATH.to_string(),
        icon: constants::PROVIDER_ICON.to_string(),
        scope: constants::SCOPE.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct VkontakteStrategy {
    ctx: Arc<SsoContext>,
    linker: IdentityLinker,
}

impl VkontakteStrategy {
    pub fn new(ctx: Arc<SsoContext>) -> Self {
        let linker = IdentityLinker::new(ctx.clone());
        Self { ctx, linker }
    }

    pub fn linker(&self) -> &IdentityLinker {
        &self.linker
    }

    /// The OAuth runtime configuration, or `None` while the app id or secret
    /// is unset.
    pub async fn config(&self) -> Option<StrategyConfig> {
        let settings = self.ctx.settings.get().await;
        if !settings.has_credentials() {
            tracing::debug!("Vkontakte app id or secret not set; strategy not registered");
            return None;
        }

        Some(StrategyConfig {
            descriptor: descriptor(),
            client_id: settings.id.trim().to_string(),
            client_secret: settings.secret.trim().to_string(),
            callback_url: self.ctx.options.url(constants::CALLBACK_PATH),
            profile_fields: constants::PROFILE_FIELDS.iter().map(|f| f.to_string()).collect(),
        })
    }

    /// Called once per successful handshake with the verified profile.
    pub async fn verify(
        &self,
        session_uid: Option<AccountId>,
        profile: ProviderProfile,
        tokens: OAuthTokens,
    ) -> Result<LinkOutcome> {
        let identity = ProviderIdentity::from_profile(profile, tokens);
        self.linker.resolve(&identity, session_uid).await
    }
}
