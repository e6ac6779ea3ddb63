use std::collections::HashMap;
use std::sync::Arc;

use super::extractors::{MetaTagStore, MetaTagStrategy, ShopifyJsonStrategy};
use super::traits::ExtractionStrategy;
use crate::scraper::HttpClient;

pub type StrategyRef = Arc<dyn ExtractionStrategy>;

/// Maps store domains to extraction strategies.
///
/// Built once at startup and shared read-only afterwards. Lookups ignore a
/// leading `www.`; domains without a registered strategy get the default.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: HashMap<String, StrategyRef>,
    default: StrategyRef,
}

fn normalize(domain: &str) -> String {
    let lower = domain.trim().to_ascii_lowercase();
    match lower.strip_prefix("www.") {
        Some(bare) => bare.to_string(),
        None => lower,
    }
}

impl StrategyRegistry {
    pub fn new(default: StrategyRef) -> Self {
        Self {
            strategies: HashMap::new(),
            default,
        }
    }

    /// Shopify JSON by default, plus the stores that need meta-tag scraping.
    pub fn with_default_strategies(http: Arc<dyn HttpClient>, user_agent: &str) -> Self {
        let shopify = Arc::new(ShopifyJsonStrategy::new(http.clone(), user_agent));
        Self::new(shopify).with_strategy(
            "buckmason.com",
            Arc::new(MetaTagStrategy::new(http, user_agent, MetaTagStore::buck_mason())),
        )
    }

    /// Register a strategy for a store domain.
    pub fn with_strategy(mut self, domain: &str, strategy: StrategyRef) -> Self {
        self.strategies.insert(normalize(domain), strategy);
        self
    }

    pub fn resolve_strategy(&self, domain: &str) -> StrategyRef {
        match self.strategies.get(&normalize(domain)) {
            Some(strategy) => strategy.clone(),
            None => self.default.clone(),
        }
    }

    pub fn has_custom_strategy(&self, domain: &str) -> bool {
        self.strategies.contains_key(&normalize(domain))
    }

    /// Domains with a custom strategy.
    pub fn custom_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.strategies.keys().cloned().collect();
        domains.sort();
        domains
    }
}
