// Environment detection and tracing setup.

use std::sync::OnceLock;

/// Cached environment mode.
static ENV_MODE: OnceLock<EnvMode> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    Production,
    Development,
    Test,
}

/// Parse an environment name.
pub fn parse_env_mode(value: &str) -> EnvMode {
    match value.trim().to_lowercase().as_str() {
        "production" | "prod" => EnvMode::Production,
        "test" | "testing" => EnvMode::Test,
        _ => EnvMode::Development,
    }
}

/// Detect the current environment mode.
/// Checks `SSO_VKONTAKTE_ENV` then `RUST_ENV`.
pub fn detect_env_mode() -> EnvMode {
    *ENV_MODE.get_or_init(|| {
        let env_val = std::env::var("SSO_VKONTAKTE_ENV")
            .or_else(|_| std::env::var("RUST_ENV"))
            .unwrap_or_default();
        parse_env_mode(&env_val)
    })
}

pub fn is_production() -> bool {
    detect_env_mode() == EnvMode::Production
}

/// The public forum URL from `FORUM_URL`.
pub fn get_url_from_env() -> Option<String> {
    std::env::var("FORUM_URL").ok().filter(|u| !u.trim().is_empty())
}

/// Install the `tracing` subscriber.
///
/// Honors `RUST_LOG`; otherwise logs this plugin at `info` in production and
/// `debug` elsewhere. Returns `false` if a subscriber was already installed.
pub fn init_logger() -> bool {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if is_production() {
            EnvFilter::new("sso_vkontakte=info,sso_vkontakte_axum=info")
        } else {
            EnvFilter::new("sso_vkontakte=debug,sso_vkontakte_axum=debug")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
