// VkontaktePlugin — the host hook implementations.

use std::sync::Arc;

use async_trait::async_trait;

use sso_vkontakte_core::error::{Result, SsoError};
use sso_vkontakte_core::models::{AccountId, AdminHeader, Association, StrategyDescriptor};
use sso_vkontakte_core::plugin::{ForumPlugin, PluginInitContext};

use crate::admin;
use crate::context::SsoContext;
use crate::strategy::{self, VkontakteStrategy};

pub const PLUGIN_ID: &str = "sso-vkontakte";

#[derive(Debug, Clone)]
pub struct VkontaktePlugin {
    ctx: Arc<SsoContext>,
    strategy: VkontakteStrategy,
}

impl VkontaktePlugin {
    pub fn new(ctx: Arc<SsoContext>) -> Self {
        let strategy = VkontakteStrategy::new(ctx.clone());
        Self { ctx, strategy }
    }

    pub fn context(&self) -> &Arc<SsoContext> {
        &self.ctx
    }

    pub fn strategy(&self) -> &VkontakteStrategy {
        &self.strategy
    }
}

#[async_trait]
impl ForumPlugin for VkontaktePlugin {
    fn id(&self) -> &str {
        PLUGIN_ID
    }

    fn name(&self) -> &str {
        "Vkontakte SSO"
    }

    async fn init(&self, ctx: &PluginInitContext<'_>) -> Result<()> {
        url::Url::parse(&ctx.options.base_url).map_err(|e| {
            SsoError::Config(format!("invalid forum URL {:?}: {e}", ctx.options.base_url))
        })?;
        tracing::info!(base_url = %ctx.options.base_url, "Vkontakte SSO plugin loaded");
        Ok(())
    }

    async fn auth_strategies(
        &self,
        mut strategies: Vec<StrategyDescriptor>,
    ) -> Result<Vec<StrategyDescriptor>> {
        if self.strategy.config().await.is_some() {
            strategies.push(strategy::descriptor());
        }
        Ok(strategies)
    }

    async fn auth_associations(
        &self,
        uid: AccountId,
        mut associations: Vec<Association>,
    ) -> Result<Vec<Association>> {
        associations.push(self.strategy.linker().association(uid).await?);
        Ok(associations)
    }

    async fn admin_header(&self, mut header: AdminHeader) -> Result<AdminHeader> {
        header.authentication.push(admin::menu_item());
        Ok(header)
    }

    async fn user_delete(&self, uid: AccountId) -> Result<()> {
        self.strategy.linker().purge(uid).await.map(|_| ())
    }
}
