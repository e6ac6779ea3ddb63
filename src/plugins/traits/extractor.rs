use async_trait::async_trait;

use crate::core::url_resolver::ProductRef;
use crate::models::ExtractionResult;
use crate::utils::error::ExtractionError;

/// Trait for implementing per-store product extraction (Shopify JSON,
/// HTML meta tags, etc.)
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Strategy metadata
    fn name(&self) -> &str;

    /// Title, image and price. Used when an item is first added.
    async fn fetch_full(&self, url: &str, product: &ProductRef) -> Result<ExtractionResult, ExtractionError>;

    /// Price only, in cents. Used on every refresh.
    async fn fetch_price(&self, product: &ProductRef) -> Result<i64, ExtractionError>;
}
