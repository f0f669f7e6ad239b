// Plugin registry — holds the enabled plugins and dispatches hooks.
//
// Filter hooks thread the host's data through each plugin in registration
// order. The first error aborts the chain.

use std::sync::Arc;

use sso_vkontakte_core::error::Result;
use sso_vkontakte_core::models::{AccountId, AdminHeader, Association, StrategyDescriptor};
use sso_vkontakte_core::plugin::{ForumPlugin, PluginInitContext};

#[derive(Debug, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn ForumPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_plugins(plugins: Vec<Arc<dyn ForumPlugin>>) -> Self {
        Self { plugins }
    }

    pub fn register(&mut self, plugin: Arc<dyn ForumPlugin>) {
        self.plugins.push(plugin);
    }

    /// Call `init` on each plugin.
    pub async fn init_all(&self, ctx: &PluginInitContext<'_>) -> Result<()> {
        for plugin in &self.plugins {
            plugin.init(ctx).await?;
            tracing::debug!(plugin = plugin.id(), "Plugin initialized");
        }
        Ok(())
    }

    // ─── Accessors ──────────────────────────────────────────────

    pub fn plugins(&self) -> &[Arc<dyn ForumPlugin>] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn has_plugin(&self, id: &str) -> bool {
        self.plugins.iter().any(|p| p.id() == id)
    }

    pub fn get_plugin(&self, id: &str) -> Option<&Arc<dyn ForumPlugin>> {
        self.plugins.iter().find(|p| p.id() == id)
    }

    // ─── Hooks ──────────────────────────────────────────────────

    pub async fn auth_strategies(
        &self,
        mut strategies: Vec<StrategyDescriptor>,
    ) -> Result<Vec<StrategyDescriptor>> {
        for plugin in &self.plugins {
            strategies = plugin.auth_strategies(strategies).await?;
        }
        Ok(strategies)
    }

    pub async fn auth_associations(
        &self,
        uid: AccountId,
        mut associations: Vec<Association>,
    ) -> Result<Vec<Association>> {
        for plugin in &self.plugins {
            associations = plugin.auth_associations(uid, associations).await?;
        }
        Ok(associations)
    }

    pub async fn admin_header(&self, mut header: AdminHeader) -> Result<AdminHeader> {
        for plugin in &self.plugins {
            header = plugin.admin_header(header).await?;
        }
        Ok(header)
    }

    pub async fn user_delete(&self, uid: AccountId) -> Result<()> {
        for plugin in &self.plugins {
            plugin.user_delete(uid).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use sso_vkontakte_core::error::SsoError;
    use sso_vkontakte_core::models::MenuItem;
    use sso_vkontakte_core::options::SsoOptions;

    use super::*;

    #[derive(Debug)]
    struct Tagger(&'static str);

    #[async_trait]
    impl ForumPlugin for Tagger {
        fn id(&self) -> &str {
            self.0
        }

        async fn admin_header(&self, mut header: AdminHeader) -> Result<AdminHeader> {
            header.plugins.push(MenuItem {
                route: format!("/plugins/{}", self.0),
                icon: String::new(),
                name: self.0.to_string(),
            });
            Ok(header)
        }
    }

    #[derive(Debug)]
    struct Broken;

    #[async_trait]
    impl ForumPlugin for Broken {
        fn id(&self) -> &str {
            "broken"
        }

        async fn init(&self, _ctx: &PluginInitContext<'_>) -> Result<()> {
            Err(SsoError::Config("nope".into()))
        }

        async fn admin_header(&self, _header: AdminHeader) -> Result<AdminHeader> {
            Err(SsoError::Unauthorized)
        }
    }

    #[tokio::test]
    async fn test_filters_run_in_order() {
        let plugins: Vec<Arc<dyn ForumPlugin>> = vec![Arc::new(Tagger("a")), Arc::new(Tagger("b"))];
        let registry = PluginRegistry::from_plugins(plugins);
        let header = registry.admin_header(AdminHeader::default()).await.unwrap();
        let names: Vec<_> = header.plugins.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(registry.has_plugin("b"));
        assert!(registry.get_plugin("c").is_none());
    }

    #[tokio::test]
    async fn test_first_error_aborts() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(Broken));
        registry.register(Arc::new(Tagger("late")));

        assert!(registry.admin_header(AdminHeader::default()).await.is_err());

        let options = SsoOptions::default();
        let err = registry.init_all(&PluginInitContext { options: &options }).await.unwrap_err();
        assert!(matches!(err, SsoError::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_registry_passes_through() {
        let registry = PluginRegistry::new();
        assert!(registry.is_empty());
        let strategies = registry.auth_strategies(vec![]).await.unwrap();
        assert!(strategies.is_empty());
        registry.user_delete(AccountId::new(1)).await.unwrap();
    }
}
