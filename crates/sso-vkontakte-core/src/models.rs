// Data models exchanged between the host, the OAuth runtime and the plugin.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Local account identifier (`uid`). `0` is the guest account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(u64);

impl AccountId {
    pub const GUEST: AccountId = AccountId(0);

    pub const fn new(uid: u64) -> Self {
        Self(uid)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// Whether this id belongs to a registered (non-guest) account.
    pub fn is_registered(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for AccountId {
    fn from(uid: u64) -> Self {
        Self(uid)
    }
}

/// A photo entry in a provider profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePhoto {
    pub value: String,
}

/// The verified profile delivered by the OAuth runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photos: Vec<ProfilePhoto>,
}

/// Tokens returned by the provider after a successful handshake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// A verified third-party identity, ready for account resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    pub id: String,
    pub display_name: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl ProviderIdentity {
    /// Combine a profile and its tokens. The first photo becomes the avatar.
    pub fn from_profile(profile: ProviderProfile, tokens: OAuthTokens) -> Self {
        let picture = profile
            .photos
            .into_iter()
            .map(|p| p.value)
            .find(|v| !v.is_empty());
        Self {
            id: profile.id,
            display_name: profile.display_name,
            username: profile.username,
            email: profile.email,
            picture,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        }
    }

    /// The email to resolve against, synthesizing a no-reply address when the
    /// provider did not return one.
    pub fn resolved_email(&self, provider: &str) -> String {
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            return email.to_string();
        }
        let local = self
            .username
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.id);
        format!("{local}@users.noreply.{provider}.com")
    }
}

/// Attributes for a new local account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
}

/// Association status shown in a user's linked-accounts view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub associated: bool,
    pub url: String,
    pub name: String,
    pub icon: String,
}

/// An entry in the admin navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub route: String,
    pub icon: String,
    pub name: String,
}

/// The admin header sections plugins may contribute to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminHeader {
    #[serde(default)]
    pub plugins: Vec<MenuItem>,
    #[serde(default)]
    pub authentication: Vec<MenuItem>,
}

/// Public description of a login strategy, listed on the login page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDescriptor {
    pub name: String,
    pub url: String,
    #[serde(rename = "callbackURL")]
    pub callback_url: String,
    pub icon: String,
    pub scope: String,
}

/// Everything the OAuth runtime needs to run the provider handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyConfig {
    pub descriptor: StrategyDescriptor,
    pub client_id: String,
    pub client_secret: String,
    /// Absolute callback URL registered with the provider.
    pub callback_url: String,
    pub profile_fields: Vec<String>,
}
