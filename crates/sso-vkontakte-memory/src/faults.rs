// Fault injection for the in-memory stores.
//
// Tests mark operations by name ("set_user_field", "get_object_field", ...)
// as failing; every store call checks its name before touching data.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use sso_vkontakte_core::error::StoreError;

/// A shared set of operation names that currently fail.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    failing: Arc<RwLock<HashSet<String>>>,
}

impl Faults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of `operation` fail.
    pub async fn fail(&self, operation: &str) {
        self.failing.write().await.insert(operation.to_string());
    }

    /// Stop failing `operation`.
    pub async fn heal(&self, operation: &str) {
        self.failing.write().await.remove(operation);
    }

    /// Stop failing everything.
    pub async fn heal_all(&self) {
        self.failing.write().await.clear();
    }

    pub(crate) async fn check(&self, operation: &str) -> Result<(), StoreError> {
        if self.failing.read().await.contains(operation) {
            return Err(StoreError::Unavailable(format!("injected failure in {operation}")));
        }
        Ok(())
    }
}
