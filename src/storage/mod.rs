//! Persistence for tracked items and settings.
//!
//! The refresh engine only sees [`ItemStore`]; the binary wires in
//! [`SqliteStore`], tests usually use [`MemoryStore`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::DatabaseConfig;
use crate::models::{NewItem, TrackedItem};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// All items, newest first.
    async fn list_items(&self) -> crate::Result<Vec<TrackedItem>>;

    async fn get_item(&self, id: &str) -> crate::Result<Option<TrackedItem>>;

    /// Fails with `AppError::DuplicateUrl` when the URL is already tracked.
    async fn create_item(&self, item: NewItem) -> crate::Result<TrackedItem>;

    async fn update_current_price(&self, id: &str, price: i64) -> crate::Result<()>;

    /// Lowers the last-notified price. Returns `false` without writing when
    /// `price` is not strictly below the stored value.
    async fn update_notified_price(&self, id: &str, price: i64) -> crate::Result<bool>;

    /// Returns whether an item was removed.
    async fn delete_item(&self, id: &str) -> crate::Result<bool>;

    async fn get_setting(&self, key: &str) -> crate::Result<Option<String>>;

    async fn set_setting(&self, key: &str, value: &str) -> crate::Result<()>;
}

/// Open the store named by the database URL.
pub async fn open(config: &DatabaseConfig) -> crate::Result<Arc<dyn ItemStore>> {
    if config.url == "memory://" {
        tracing::warn!("Using the in-memory store; items are lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = SqliteStore::connect(&config.url, config.max_connections).await?;
    Ok(Arc::new(store))
}

/// `true` only when the stored notified price may be replaced by `price`.
pub(crate) fn lowers_notified(current: Option<i64>, price: i64) -> bool {
    match current {
        Some(notified) => price < notified,
        None => true,
    }
}
