// OAuth runtime seam.
//
// The provider handshake (authorization redirect, code exchange, profile
// fetch, state checks) is performed by an external runtime. The plugin hands
// it a `StrategyConfig` and receives a verified profile back.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SsoError;
use crate::models::{OAuthTokens, ProviderProfile, StrategyConfig};

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// The outcome of a completed handshake.
#[derive(Debug, Clone)]
pub struct VerifiedCallback {
    pub profile: ProviderProfile,
    pub tokens: OAuthTokens,
}

/// The external OAuth strategy runtime.
#[async_trait]
pub trait OAuthRuntime: Send + Sync + std::fmt::Debug {
    /// Where to send the browser to start the handshake.
    async fn authorization_url(&self, config: &StrategyConfig) -> Result<String, SsoError>;

    /// Finish the handshake from the callback query.
    async fn complete(
        &self,
        config: &StrategyConfig,
        query: &CallbackQuery,
    ) -> Result<VerifiedCallback, SsoError>;
}
