// sso-vkontakte — "Login with Vkontakte" for forum hosts.
//
// Wires the settings cache, identity linker, strategy registration, admin
// panel and host hooks together on top of the collaborator traits in
// `sso-vkontakte-core`.

#![doc = include_str!("../README.md")]

pub mod admin;
pub mod constants;
pub mod context;
pub mod linker;
pub mod plugin;
pub mod plugin_runtime;
pub mod settings;
pub mod strategy;

pub use context::SsoContext;
pub use linker::{IdentityLinker, LinkOutcome, ResolutionKind};
pub use plugin::VkontaktePlugin;
pub use plugin_runtime::PluginRegistry;
pub use settings::SettingsCache;
pub use strategy::VkontakteStrategy;
