// In-memory user, object and settings stores.
//
// Data lives in `HashMap`s behind `Arc<tokio::sync::RwLock<...>>`, so clones
// share state and everything is lost when the last clone is dropped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use sso_vkontakte_core::error::StoreError;
use sso_vkontakte_core::models::{AccountId, NewUser};
use sso_vkontakte_core::store::{ObjectStore, SettingsStore, UserStore};

use crate::faults::Faults;

type Fields = HashMap<String, String>;

// ─── Users ──────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<AccountId, Fields>,
    /// Lowercased email → owner.
    emails: HashMap<String, AccountId>,
}

/// In-memory host user store. Uids start at 1.
#[derive(Debug, Clone)]
pub struct MemoryUserStore {
    table: Arc<RwLock<UserTable>>,
    next_uid: Arc<AtomicU64>,
    created: Arc<AtomicUsize>,
    faults: Faults,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::with_faults(Faults::new())
    }

    pub fn with_faults(faults: Faults) -> Self {
        Self {
            table: Arc::new(RwLock::new(UserTable::default())),
            next_uid: Arc::new(AtomicU64::new(1)),
            created: Arc::new(AtomicUsize::new(0)),
            faults,
        }
    }

    /// The fault switchboard for this store.
    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    /// Number of `create_user` calls that succeeded.
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.table.read().await.users.len()
    }

    /// A copy of every field of `uid`.
    pub async fn fields(&self, uid: AccountId) -> Option<Fields> {
        self.table.read().await.users.get(&uid).cloned()
    }

    fn insert(table: &mut UserTable, uid: AccountId, user: &NewUser) {
        let mut fields = Fields::new();
        fields.insert("uid".into(), uid.to_string());
        fields.insert("username".into(), user.username.clone());
        fields.insert("userslug".into(), user.username.to_lowercase().replace(' ', "-"));
        fields.insert("email".into(), user.email.clone());
        fields.insert("joindate".into(), chrono::Utc::now().timestamp_millis().to_string());
        table.users.insert(uid, fields);
        if !user.email.is_empty() {
            table.emails.insert(user.email.to_lowercase(), uid);
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user_field(&self, uid: AccountId, field: &str) -> Result<Option<String>, StoreError> {
        self.faults.check("get_user_field").await?;
        let table = self.table.read().await;
        Ok(table.users.get(&uid).and_then(|f| f.get(field)).cloned())
    }

    async fn set_user_field(&self, uid: AccountId, field: &str, value: &str) -> Result<(), StoreError> {
        self.faults.check("set_user_field").await?;
        let mut table = self.table.write().await;
        let previous = table
            .users
            .entry(uid)
            .or_default()
            .insert(field.to_string(), value.to_string());
        if field == "email" {
            if let Some(old) = previous {
                table.emails.remove(&old.to_lowercase());
            }
            if !value.is_empty() {
                table.emails.insert(value.to_lowercase(), uid);
            }
        }
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> Result<AccountId, StoreError> {
        self.faults.check("create_user").await?;
        let mut table = self.table.write().await;
        if !user.email.is_empty() && table.emails.contains_key(&user.email.to_lowercase()) {
            return Err(StoreError::OperationFailed(format!(
                "email already taken: {}",
                user.email
            )));
        }
        let uid = AccountId::new(self.next_uid.fetch_add(1, Ordering::SeqCst));
        Self::insert(&mut table, uid, &user);
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(uid)
    }

    async fn get_uid_by_email(&self, email: &str) -> Result<Option<AccountId>, StoreError> {
        self.faults.check("get_uid_by_email").await?;
        let table = self.table.read().await;
        Ok(table.emails.get(&email.to_lowercase()).copied())
    }
}

// ─── Objects ────────────────────────────────────────────────────

/// In-memory key-value object store.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<RwLock<HashMap<String, Fields>>>,
    faults: Faults,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: Faults) -> Self {
        Self {
            objects: Arc::default(),
            faults,
        }
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    /// A copy of the object stored under `key`.
    pub async fn object(&self, key: &str) -> Fields {
        self.objects.read().await.get(key).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get_object_field(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        self.faults.check("get_object_field").await?;
        let objects = self.objects.read().await;
        Ok(objects.get(key).and_then(|o| o.get(field)).cloned())
    }

    async fn set_object_field(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.faults.check("set_object_field").await?;
        self.objects
            .write()
            .await
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_object_field(&self, key: &str, field: &str) -> Result<(), StoreError> {
        self.faults.check("delete_object_field").await?;
        let mut objects = self.objects.write().await;
        if let Some(object) = objects.get_mut(key) {
            object.remove(field);
            if object.is_empty() {
                objects.remove(key);
            }
        }
        Ok(())
    }
}

// ─── Settings ───────────────────────────────────────────────────

/// In-memory settings store with optional read latency.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    values: Arc<RwLock<HashMap<String, Value>>>,
    reads: Arc<AtomicUsize>,
    latency: Option<Duration>,
    faults: Faults,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every `get` by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    pub fn faults(&self) -> &Faults {
        &self.faults
    }

    /// Number of `get` calls that reached the store.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.faults.check("settings_get").await?;
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.faults.check("settings_set").await?;
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bob() -> NewUser {
        NewUser {
            username: "Bob Smith".into(),
            email: "Bob@Example.com".into(),
        }
    }

    #[tokio::test]
    async fn test_create_user_assigns_sequential_uids() {
        let store = MemoryUserStore::new();
        let a = store.create_user(bob()).await.unwrap();
        let b = store
            .create_user(NewUser { username: "ann".into(), email: "ann@example.com".into() })
            .await
            .unwrap();
        assert_eq!(a, AccountId::new(1));
        assert_eq!(b, AccountId::new(2));
        assert_eq!(store.created_count(), 2);

        let fields = store.fields(a).await.unwrap();
        assert_eq!(fields["userslug"], "bob-smith");
        assert!(fields.contains_key("joindate"));
    }

    #[tokio::test]
    async fn test_email_lookup_is_case_insensitive() {
        let store = MemoryUserStore::new();
        let uid = store.create_user(bob()).await.unwrap();
        assert_eq!(store.get_uid_by_email("bob@example.com").await.unwrap(), Some(uid));
        assert_eq!(store.get_uid_by_email("nobody@example.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryUserStore::new();
        store.create_user(bob()).await.unwrap();
        assert!(store.create_user(bob()).await.is_err());
        assert_eq!(store.created_count(), 1);
    }

    #[tokio::test]
    async fn test_set_email_field_reindexes() {
        let store = MemoryUserStore::new();
        let uid = store.create_user(bob()).await.unwrap();
        store.set_user_field(uid, "email", "new@example.com").await.unwrap();
        assert_eq!(store.get_uid_by_email("bob@example.com").await.unwrap(), None);
        assert_eq!(store.get_uid_by_email("new@example.com").await.unwrap(), Some(uid));
    }

    #[tokio::test]
    async fn test_user_faults() {
        let store = MemoryUserStore::new();
        store.faults().fail("create_user").await;
        assert!(store.create_user(bob()).await.is_err());
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_object_field_roundtrip_and_delete() {
        let store = MemoryObjectStore::new();
        store.set_object_field("vkontakteid:uid", "123", "1").await.unwrap();
        assert_eq!(
            store.get_object_field("vkontakteid:uid", "123").await.unwrap().as_deref(),
            Some("1")
        );
        store.delete_object_field("vkontakteid:uid", "123").await.unwrap();
        assert_eq!(store.get_object_field("vkontakteid:uid", "123").await.unwrap(), None);
        // Deleting again is fine
        store.delete_object_field("vkontakteid:uid", "123").await.unwrap();
        assert!(store.object("vkontakteid:uid").await.is_empty());
    }

    #[tokio::test]
    async fn test_settings_store_counts_reads() {
        let store = MemorySettingsStore::new();
        store.set("sso-vkontakte", serde_json::json!({"id": "app"})).await.unwrap();
        let value = store.get("sso-vkontakte").await.unwrap().unwrap();
        assert_eq!(value["id"], "app");
        assert_eq!(store.get("other").await.unwrap(), None);
        assert_eq!(store.read_count(), 2);
    }
}
