use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use super::ItemStore;
use crate::models::{NewItem, SystemSetting, TrackedItem};
use crate::utils::error::AppError;

const CREATE_ITEMS: &str = r"
    CREATE TABLE IF NOT EXISTS items (
        id TEXT PRIMARY KEY,
        url TEXT NOT NULL UNIQUE,
        store_domain TEXT NOT NULL,
        handle TEXT NOT NULL,
        title TEXT,
        image_url TEXT,
        original_price INTEGER,
        current_price INTEGER,
        notified_price INTEGER,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )";

const CREATE_SETTINGS: &str = r"
    CREATE TABLE IF NOT EXISTS settings (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )";

const SELECT_ITEM: &str = r"
    SELECT id, url, store_domain, handle, title, image_url,
           original_price, current_price, notified_price, created_at, updated_at
    FROM items";

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and create the schema if needed.
    pub async fn connect(url: &str, max_connections: u32) -> crate::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // Every connection to `:memory:` is its own database.
        let in_memory = url.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { max_connections.max(1) })
            .idle_timeout(if in_memory { None } else { Some(std::time::Duration::from_secs(600)) })
            .max_lifetime(if in_memory { None } else { Some(std::time::Duration::from_secs(1800)) })
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::info!(url = %url, "Connected to item database");
        Ok(store)
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> crate::Result<()> {
        sqlx::query(CREATE_ITEMS).execute(&self.pool).await?;
        sqlx::query(CREATE_SETTINGS).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl ItemStore for SqliteStore {
    async fn list_items(&self) -> crate::Result<Vec<TrackedItem>> {
        let items = sqlx::query_as::<_, TrackedItem>(&format!("{SELECT_ITEM} ORDER BY created_at DESC, rowid DESC"))
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn get_item(&self, id: &str) -> crate::Result<Option<TrackedItem>> {
        let item = sqlx::query_as::<_, TrackedItem>(&format!("{SELECT_ITEM} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn create_item(&self, new_item: NewItem) -> crate::Result<TrackedItem> {
        let url = new_item.url.clone();
        let item = TrackedItem::new(new_item);

        let inserted = sqlx::query(
            r"
            INSERT INTO items
            (id, url, store_domain, handle, title, image_url,
             original_price, current_price, notified_price, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(&item.id)
        .bind(&item.url)
        .bind(&item.store_domain)
        .bind(&item.handle)
        .bind(&item.title)
        .bind(&item.image_url)
        .bind(item.original_price)
        .bind(item.current_price)
        .bind(item.notified_price)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(item),
            Err(e) if is_unique_violation(&e) => Err(AppError::DuplicateUrl { url }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_current_price(&self, id: &str, price: i64) -> crate::Result<()> {
        let result = sqlx::query("UPDATE items SET current_price = ?, updated_at = ? WHERE id = ?")
            .bind(price)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound {
                resource: format!("item {}", id),
            });
        }
        Ok(())
    }

    async fn update_notified_price(&self, id: &str, price: i64) -> crate::Result<bool> {
        let result = sqlx::query(
            r"
            UPDATE items SET notified_price = ?, updated_at = ?
            WHERE id = ? AND (notified_price IS NULL OR notified_price > ?)
            ",
        )
        .bind(price)
        .bind(Utc::now())
        .bind(id)
        .bind(price)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_item(&self, id: &str) -> crate::Result<bool> {
        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_setting(&self, key: &str) -> crate::Result<Option<String>> {
        let setting = sqlx::query_as::<_, SystemSetting>("SELECT key, value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(setting.map(|s| s.value))
    }

    async fn set_setting(&self, key: &str, value: &str) -> crate::Result<()> {
        sqlx::query(
            r"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
