// Error types shared by every crate in the workspace.
//
// `StoreError` is what collaborator stores report; `SsoError` is what plugin
// operations return; `ErrorCode` is the stable code carried in HTTP bodies.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::AccountId;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    StorageUnavailable,
    FailedToUnlinkAccount,
    StrategyNotConfigured,
    OauthFailed,
    Unauthorized,
    Forbidden,
    CouldNotParseBody,
}

impl ErrorCode {
    /// The wire form, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
            Self::FailedToUnlinkAccount => "FAILED_TO_UNLINK_ACCOUNT",
            Self::StrategyNotConfigured => "STRATEGY_NOT_CONFIGURED",
            Self::OauthFailed => "OAUTH_FAILED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::CouldNotParseBody => "COULD_NOT_PARSE_BODY",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::StorageUnavailable => "Storage unavailable",
            Self::FailedToUnlinkAccount => "Failed to unlink account",
            Self::StrategyNotConfigured => "Vkontakte strategy is not configured",
            Self::OauthFailed => "OAuth authentication failed",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::CouldNotParseBody => "Could not parse body",
        };
        write!(f, "{msg}")
    }
}

/// Failure reported by a collaborator store (user, object, settings, session).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Store operation failed: {0}")]
    OperationFailed(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Error returned by plugin operations.
#[derive(Debug, thiserror::Error)]
pub enum SsoError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Purge could not remove the linkage; carries the account that was processed.
    #[error("Could not remove OAuth id data for uid {uid}: {source}")]
    PurgeFailed {
        uid: AccountId,
        #[source]
        source: StoreError,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl SsoError {
    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Store(_) => ErrorCode::StorageUnavailable,
            Self::PurgeFailed { .. } => ErrorCode::FailedToUnlinkAccount,
            Self::Config(_) => ErrorCode::StrategyNotConfigured,
            Self::OAuth(_) => ErrorCode::OauthFailed,
            Self::Unauthorized => ErrorCode::Unauthorized,
        }
    }

    /// Build a JSON body for an error response.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        })
    }
}

/// Unified result type for plugin operations.
pub type Result<T> = std::result::Result<T, SsoError>;
