// Plugin trait — the hook surface a forum host drives.
//
// Filter hooks receive the host's current data and return it, possibly
// extended. Static hooks only report success or failure. Every hook has a
// no-op default so a plugin implements just what it contributes.

use std::fmt;

use async_trait::async_trait;

use crate::error::SsoError;
use crate::models::{AccountId, AdminHeader, Association, StrategyDescriptor};
use crate::options::SsoOptions;

/// Context available during plugin initialization.
#[derive(Debug)]
pub struct PluginInitContext<'a> {
    /// The startup options (read-only).
    pub options: &'a SsoOptions,
}

/// The plugin hooks.
#[async_trait]
pub trait ForumPlugin: Send + Sync + fmt::Debug {
    /// Unique identifier (e.g. "sso-vkontakte").
    fn id(&self) -> &str;

    /// Human-readable plugin name.
    fn name(&self) -> &str {
        self.id()
    }

    /// Called once when the host application loads.
    async fn init(&self, _ctx: &PluginInitContext<'_>) -> Result<(), SsoError> {
        Ok(())
    }

    /// Filter: the login strategies offered on the login page.
    async fn auth_strategies(
        &self,
        strategies: Vec<StrategyDescriptor>,
    ) -> Result<Vec<StrategyDescriptor>, SsoError> {
        Ok(strategies)
    }

    /// Filter: the linked-accounts list for `uid`.
    async fn auth_associations(
        &self,
        _uid: AccountId,
        associations: Vec<Association>,
    ) -> Result<Vec<Association>, SsoError> {
        Ok(associations)
    }

    /// Filter: the admin navigation header.
    async fn admin_header(&self, header: AdminHeader) -> Result<AdminHeader, SsoError> {
        Ok(header)
    }

    /// Static: the account is being deleted; remove plugin data for it.
    async fn user_delete(&self, _uid: AccountId) -> Result<(), SsoError> {
        Ok(())
    }
}
