//! Default strategy: the storefront platform's public product JSON at
//! `https://<domain>/products/<handle>.json`.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use crate::core::price::cents_from_json;
use crate::core::url_resolver::ProductRef;
use crate::models::ExtractionResult;
use crate::plugins::traits::ExtractionStrategy;
use crate::scraper::{HttpClient, HttpClientError};
use crate::utils::error::ExtractionError;

#[derive(Debug, Deserialize)]
struct ProductEnvelope {
    product: Option<ShopifyProduct>,
}

#[derive(Debug, Deserialize)]
struct ShopifyProduct {
    title: Option<String>,
    #[serde(default)]
    variants: Vec<ShopifyVariant>,
    #[serde(default)]
    images: Vec<ShopifyImage>,
    image: Option<ShopifyImage>,
}

#[derive(Debug, Deserialize)]
struct ShopifyVariant {
    price: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ShopifyImage {
    src: Option<String>,
}

pub struct ShopifyJsonStrategy {
    http: Arc<dyn HttpClient>,
    user_agent: String,
    scheme: String,
}

impl ShopifyJsonStrategy {
    pub fn new(http: Arc<dyn HttpClient>, user_agent: impl Into<String>) -> Self {
        Self {
            http,
            user_agent: user_agent.into(),
            scheme: "https".to_string(),
        }
    }

    /// Plain-HTTP endpoints, for local test servers.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn endpoint(&self, product: &ProductRef) -> String {
        format!("{}://{}/products/{}.json", self.scheme, product.domain, product.handle)
    }

    async fn fetch_product(&self, product: &ProductRef) -> Result<ShopifyProduct, ExtractionError> {
        let url = self.endpoint(product);
        let headers = [("User-Agent", self.user_agent.as_str()), ("Accept", "application/json")];

        let response = self.http.get(&url, &headers).await.map_err(|e| {
            tracing::warn!(domain = %product.domain, error = %e, "Storefront unreachable");
            match e {
                HttpClientError::Timeout => ExtractionError::Timeout {
                    domain: product.domain.clone(),
                },
                HttpClientError::Connection(_) => ExtractionError::Connection {
                    domain: product.domain.clone(),
                },
            }
        })?;

        if !response.is_success() {
            tracing::debug!(url = %url, status = response.status, "Product JSON request rejected");
            return Err(if response.status == 404 {
                ExtractionError::not_found()
            } else {
                ExtractionError::blocked()
            });
        }

        let envelope: ProductEnvelope =
            serde_json::from_str(&response.body).map_err(|_| ExtractionError::unsupported())?;
        envelope.product.ok_or_else(ExtractionError::unsupported)
    }
}

impl ShopifyProduct {
    fn price_cents(&self) -> Result<i64, ExtractionError> {
        let variant = self.variants.first().ok_or(ExtractionError::NoVariants)?;
        cents_from_json(variant.price.as_ref())
    }

    fn image_url(&self) -> String {
        self.images
            .first()
            .and_then(|image| image.src.clone())
            .or_else(|| self.image.as_ref().and_then(|image| image.src.clone()))
            .unwrap_or_default()
    }
}

#[async_trait]
impl ExtractionStrategy for ShopifyJsonStrategy {
    fn name(&self) -> &str {
        "shopify-json"
    }

    async fn fetch_full(&self, _url: &str, product: &ProductRef) -> Result<ExtractionResult, ExtractionError> {
        let data = self.fetch_product(product).await?;
        let price = data.price_cents()?;

        Ok(ExtractionResult {
            handle: product.handle.clone(),
            store_domain: product.domain.clone(),
            title: data.title.clone().unwrap_or_else(|| "Unknown Product".to_string()),
            image_url: data.image_url(),
            price,
        })
    }

    async fn fetch_price(&self, product: &ProductRef) -> Result<i64, ExtractionError> {
        self.fetch_product(product).await?.price_cents()
    }
}
