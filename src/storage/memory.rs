use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{lowers_notified, ItemStore};
use crate::models::{NewItem, TrackedItem};
use crate::utils::error::AppError;

/// Process-local store. No lock is held across an await point.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, TrackedItem>>,
    settings: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item as-is, bypassing URL uniqueness. Used to seed state.
    pub async fn insert(&self, item: TrackedItem) {
        self.items.write().await.insert(item.id.clone(), item);
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn list_items(&self) -> crate::Result<Vec<TrackedItem>> {
        let mut items: Vec<TrackedItem> = self.items.read().await.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn get_item(&self, id: &str) -> crate::Result<Option<TrackedItem>> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn create_item(&self, new_item: NewItem) -> crate::Result<TrackedItem> {
        let mut items = self.items.write().await;
        if items.values().any(|existing| existing.url == new_item.url) {
            return Err(AppError::DuplicateUrl { url: new_item.url });
        }

        let item = TrackedItem::new(new_item);
        items.insert(item.id.clone(), item.clone());
        Ok(item)
    }

    async fn update_current_price(&self, id: &str, price: i64) -> crate::Result<()> {
        let mut items = self.items.write().await;
        let item = items.get_mut(id).ok_or_else(|| AppError::NotFound {
            resource: format!("item {}", id),
        })?;
        item.current_price = Some(price);
        item.updated_at = Utc::now();
        Ok(())
    }

    async fn update_notified_price(&self, id: &str, price: i64) -> crate::Result<bool> {
        let mut items = self.items.write().await;
        match items.get_mut(id) {
            Some(item) if lowers_notified(item.notified_price, price) => {
                item.notified_price = Some(price);
                item.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_item(&self, id: &str) -> crate::Result<bool> {
        Ok(self.items.write().await.remove(id).is_some())
    }

    async fn get_setting(&self, key: &str) -> crate::Result<Option<String>> {
        Ok(self.settings.read().await.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> crate::Result<()> {
        self.settings.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
