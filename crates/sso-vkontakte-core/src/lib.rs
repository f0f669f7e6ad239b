#![doc = include_str!("../README.md")]

pub mod env;
pub mod error;
pub mod models;
pub mod oauth;
pub mod options;
pub mod plugin;
pub mod store;

// Re-exports for convenience
pub use error::{ErrorCode, SsoError, StoreError};
pub use models::{
    AccountId, AdminHeader, Association, MenuItem, NewUser, OAuthTokens, ProfilePhoto,
    ProviderIdentity, ProviderProfile, StrategyConfig, StrategyDescriptor,
};
pub use oauth::{CallbackQuery, OAuthRuntime, VerifiedCallback};
pub use options::{ProviderSettings, SsoOptions};
pub use plugin::{ForumPlugin, PluginInitContext};
pub use store::{ObjectStore, SessionStore, SettingsStore, UserStore};
