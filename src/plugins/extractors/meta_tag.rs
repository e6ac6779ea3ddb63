//! Stores that don't expose product JSON are read from the `<meta>` tags of
//! the product page itself.

use async_trait::async_trait;
use regex::Regex;
use std::sync::Arc;

use crate::core::price::parse_cents;
use crate::core::url_resolver::ProductRef;
use crate::models::ExtractionResult;
use crate::plugins::traits::ExtractionStrategy;
use crate::scraper::{HttpClient, HttpClientError};
use crate::utils::error::ExtractionError;

/// A meta tag key with its lookup patterns compiled once.
///
/// Templating engines disagree on attribute order, so three shapes are tried:
/// `property` then `content`, `content` then `property`, `name` then `content`.
#[derive(Debug, Clone)]
pub struct MetaProperty {
    pub key: String,
    patterns: Vec<Regex>,
}

impl MetaProperty {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let escaped = regex::escape(&key);
        let patterns = [
            format!(r#"(?i)<meta[^>]*property=["']{escaped}["'][^>]*content=["']([^"']*)["']"#),
            format!(r#"(?i)<meta[^>]*content=["']([^"']*)["'][^>]*property=["']{escaped}["']"#),
            format!(r#"(?i)<meta[^>]*name=["']{escaped}["'][^>]*content=["']([^"']*)["']"#),
        ]
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect();

        Self { key, patterns }
    }

    /// The tag's `content`, if the page carries it.
    pub fn extract(&self, html: &str) -> Option<String> {
        self.patterns.iter().find_map(|regex| {
            regex
                .captures(html)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str().to_string())
        })
    }
}

/// One-off lookup; strategies keep their [`MetaProperty`] values instead.
pub fn extract_meta_content(html: &str, property: &str) -> Option<String> {
    MetaProperty::new(property).extract(html)
}

/// Per-store settings for a meta-tag strategy.
#[derive(Debug, Clone)]
pub struct MetaTagStore {
    pub name: String,
    /// Tried in order until one is present.
    pub price_properties: Vec<MetaProperty>,
    pub title_property: MetaProperty,
    pub image_property: MetaProperty,
    /// Removed from the page title, e.g. a trailing brand suffix.
    pub title_cleanup: Option<Regex>,
}

impl MetaTagStore {
    pub fn open_graph(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price_properties: vec![
                MetaProperty::new("product:price:amount"),
                MetaProperty::new("og:price:amount"),
            ],
            title_property: MetaProperty::new("og:title"),
            image_property: MetaProperty::new("og:image"),
            title_cleanup: None,
        }
    }

    pub fn with_title_cleanup(mut self, pattern: Regex) -> Self {
        self.title_cleanup = Some(pattern);
        self
    }

    /// Titles look like "Slub Tee - Buck Mason- Modern American Classics".
    pub fn buck_mason() -> Self {
        let store = Self::open_graph("Buck Mason");
        match Regex::new(r"(?i)\s*-\s*Buck Mason.*$") {
            Ok(suffix) => store.with_title_cleanup(suffix),
            Err(_) => store,
        }
    }

    fn clean_title(&self, raw: &str) -> String {
        match &self.title_cleanup {
            Some(pattern) => pattern.replace(raw, "").trim().to_string(),
            None => raw.trim().to_string(),
        }
    }
}

pub struct MetaTagStrategy {
    http: Arc<dyn HttpClient>,
    user_agent: String,
    store: MetaTagStore,
}

impl MetaTagStrategy {
    pub fn new(http: Arc<dyn HttpClient>, user_agent: impl Into<String>, store: MetaTagStore) -> Self {
        Self {
            http,
            user_agent: user_agent.into(),
            store,
        }
    }

    fn parse_page(&self, html: &str, product: &ProductRef) -> Result<ExtractionResult, ExtractionError> {
        let parse_error = || ExtractionError::StoreParse {
            store: self.store.name.clone(),
        };

        let price_raw = self
            .store
            .price_properties
            .iter()
            .find_map(|property| property.extract(html))
            .ok_or_else(parse_error)?;
        let title = self.store.title_property.extract(html).ok_or_else(parse_error)?;
        let image_url = self.store.image_property.extract(html).unwrap_or_default();

        let price = parse_cents(&price_raw).map_err(|_| parse_error())?;

        Ok(ExtractionResult {
            handle: product.handle.clone(),
            store_domain: product.domain.clone(),
            title: self.store.clean_title(&title),
            image_url,
            price,
        })
    }
}

#[async_trait]
impl ExtractionStrategy for MetaTagStrategy {
    fn name(&self) -> &str {
        "meta-tag"
    }

    async fn fetch_full(&self, url: &str, product: &ProductRef) -> Result<ExtractionResult, ExtractionError> {
        let headers = [("User-Agent", self.user_agent.as_str()), ("Accept", "text/html")];
        let fetch_error = || ExtractionError::StoreFetch {
            store: self.store.name.clone(),
        };

        let response = self.http.get(url, &headers).await.map_err(|e| {
            tracing::warn!(store = %self.store.name, url = %url, error = %e, "Product page request failed");
            match e {
                HttpClientError::Timeout => ExtractionError::Timeout {
                    domain: product.domain.clone(),
                },
                HttpClientError::Connection(_) => fetch_error(),
            }
        })?;

        if !response.is_success() {
            tracing::debug!(store = %self.store.name, status = response.status, "Product page rejected");
            return Err(fetch_error());
        }

        self.parse_page(&response.body, product)
    }

    async fn fetch_price(&self, product: &ProductRef) -> Result<i64, ExtractionError> {
        let url = product.page_url();
        Ok(self.fetch_full(&url, product).await?.price)
    }
}
