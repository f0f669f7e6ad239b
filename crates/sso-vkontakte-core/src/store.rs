// Collaborator store traits.
//
// The host platform owns user records, the generic key-value object store,
// plugin settings and sessions. The plugin only talks to them through these
// traits; `sso-vkontakte-memory` provides in-process implementations.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;
use crate::models::{AccountId, NewUser};

/// Host user-record store.
///
/// Fields are addressed by name and stored as strings, the way the host keeps
/// them in its user hashes.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    /// Read one field of a user. `None` if the user or the field is missing.
    async fn get_user_field(&self, uid: AccountId, field: &str) -> Result<Option<String>, StoreError>;

    /// Write one field of a user, overwriting any previous value.
    async fn set_user_field(&self, uid: AccountId, field: &str, value: &str) -> Result<(), StoreError>;

    /// Create a user and return its id.
    async fn create_user(&self, user: NewUser) -> Result<AccountId, StoreError>;

    /// Find the account that owns `email`.
    async fn get_uid_by_email(&self, email: &str) -> Result<Option<AccountId>, StoreError>;
}

/// Generic key-value object store: named hashes of string fields.
#[async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    async fn get_object_field(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    async fn set_object_field(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    /// Delete one field. Deleting a missing field is not an error.
    async fn delete_object_field(&self, key: &str, field: &str) -> Result<(), StoreError>;
}

/// Plugin settings persistence. Values are JSON objects keyed by plugin.
#[async_trait]
pub trait SettingsStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Host session machinery.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// The account bound to a session token, if any.
    async fn current_uid(&self, token: &str) -> Result<Option<AccountId>, StoreError>;

    /// Whether the account may use the admin panel.
    async fn is_admin(&self, uid: AccountId) -> Result<bool, StoreError>;

    /// Establish a login session for `uid` and return its token.
    async fn on_successful_login(&self, uid: AccountId) -> Result<String, StoreError>;
}
