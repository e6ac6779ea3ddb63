use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::core::url_resolver::ProductRef;
use crate::models::{generate_id, ExtractionResult};

/// A product being monitored on a storefront.
///
/// Prices are integer minor currency units (cents). `original_price` is the
/// baseline recorded when the item was added and never changes afterwards.
/// `notified_price` is the price at which the user was last alerted and only
/// ever moves downwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct TrackedItem {
    pub id: String,
    pub url: String,
    pub store_domain: String,
    pub handle: String,
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub original_price: Option<i64>,
    pub current_price: Option<i64>,
    pub notified_price: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields needed to persist a newly added item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewItem {
    pub url: String,
    pub store_domain: String,
    pub handle: String,
    pub title: String,
    pub image_url: String,
    pub price: i64,
}

impl NewItem {
    /// Domain and handle come from the resolved URL, never from the remote
    /// response, so they stay a pure function of `url`.
    pub fn from_extraction(url: &str, product: &ProductRef, extracted: ExtractionResult) -> Self {
        Self {
            url: url.to_string(),
            store_domain: product.domain.clone(),
            handle: product.handle.clone(),
            title: extracted.title,
            image_url: extracted.image_url,
            price: extracted.price,
        }
    }
}

impl TrackedItem {
    pub fn new(new_item: NewItem) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            url: new_item.url,
            store_domain: new_item.store_domain,
            handle: new_item.handle,
            title: Some(new_item.title),
            image_url: Some(new_item.image_url),
            original_price: Some(new_item.price),
            current_price: Some(new_item.price),
            notified_price: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn product_ref(&self) -> ProductRef {
        ProductRef {
            domain: self.store_domain.clone(),
            handle: self.handle.clone(),
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Unknown Product")
    }
}
