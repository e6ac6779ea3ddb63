//! Product URL parsing.
//!
//! A storefront product page looks like `https://<domain>/products/<handle>`,
//! optionally nested under a collection path and followed by a query string.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::utils::error::ExtractionError;

/// Hostname plus the product handle, if the path has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub domain: String,
    pub handle: Option<String>,
}

/// A fully identified product on a storefront.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductRef {
    pub domain: String,
    pub handle: String,
}

impl ProductRef {
    /// Canonical product page for this product.
    pub fn page_url(&self) -> String {
        format!("https://{}/products/{}", self.domain, self.handle)
    }
}

impl ResolvedUrl {
    /// Callers that need a product page treat a missing handle as an
    /// unsupported store.
    pub fn require_handle(self) -> Result<ProductRef, ExtractionError> {
        match self.handle {
            Some(handle) => Ok(ProductRef {
                domain: self.domain,
                handle,
            }),
            None => Err(ExtractionError::UnsupportedStore),
        }
    }
}

pub fn resolve(url: &str) -> Result<ResolvedUrl, ExtractionError> {
    let parsed = Url::parse(url.trim()).map_err(|_| ExtractionError::InvalidUrl(url.to_string()))?;

    let domain = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_string(),
        _ => return Err(ExtractionError::InvalidUrl(url.to_string())),
    };

    let handle = parsed.path_segments().and_then(|segments| {
        let segments: Vec<&str> = segments.collect();
        segments
            .windows(2)
            .find(|pair| pair[0] == "products" && !pair[1].is_empty())
            .map(|pair| pair[1].to_string())
    });

    Ok(ResolvedUrl { domain, handle })
}

/// Resolve and require a handle in one step.
pub fn resolve_product(url: &str) -> Result<ProductRef, ExtractionError> {
    resolve(url)?.require_handle()
}

/// Friendly store name for display.
pub fn store_name(domain: &str) -> String {
    let known = [
        ("toddsnyder", "Todd Snyder"),
        ("brut", "BRUT"),
        ("percival", "Percival"),
        ("buckmason", "Buck Mason"),
    ];
    if let Some((_, name)) = known.iter().find(|(needle, _)| domain.contains(needle)) {
        return name.to_string();
    }

    let bare = domain.strip_prefix("www.").unwrap_or(domain);
    bare.split('.').next().unwrap_or(bare).to_string()
}
