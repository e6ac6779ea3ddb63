use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use validator::{Validate, ValidateEmail};

use crate::config::AppConfig;
use crate::core::url_resolver;
use crate::core::{NotificationDispatcher, RefreshOrchestrator};
use crate::models::{NewItem, RefreshCycleSummary, SystemSetting, TrackedItem, NOTIFICATION_EMAIL};
use crate::plugins::notifiers::EmailTransport;
use crate::plugins::{NotificationTransport, StrategyRegistry};
use crate::scraper::ReqwestHttpClient;
use crate::storage::ItemStore;
use crate::utils::error::AppError;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddItemRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "URL is required"))]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SettingUpdate {
    #[serde(default)]
    #[validate(length(min = 1, message = "Value is required"))]
    pub value: String,
}

/// Entry point for everything the outer surfaces do with tracked items.
pub struct ItemManager {
    registry: Arc<StrategyRegistry>,
    store: Arc<dyn ItemStore>,
    orchestrator: RefreshOrchestrator,
    dispatcher: Option<NotificationDispatcher>,
    default_recipient: Option<String>,
}

impl ItemManager {
    pub fn new(registry: Arc<StrategyRegistry>, store: Arc<dyn ItemStore>) -> Self {
        let orchestrator = RefreshOrchestrator::new(registry.clone(), store.clone());
        Self {
            registry,
            store,
            orchestrator,
            dispatcher: None,
            default_recipient: None,
        }
    }

    /// Wire the real HTTP client, strategies and (if configured) SMTP.
    pub fn from_config(config: &AppConfig, store: Arc<dyn ItemStore>) -> Result<Self> {
        let http = Arc::new(ReqwestHttpClient::new(&config.scraper)?);
        let registry = Arc::new(StrategyRegistry::with_default_strategies(http, &config.scraper.user_agent));

        let mut manager = Self::new(registry, store)
            .with_fetch_timeout(Duration::from_secs(config.scraper.refresh_timeout_secs))
            .with_default_recipient(config.notifications.recipient.clone());

        match &config.notifications.smtp {
            Some(smtp) => {
                manager = manager.with_transport(Arc::new(EmailTransport::new(smtp)?));
                tracing::info!(host = %smtp.host, "Email notifications enabled");
            }
            None => tracing::info!("SMTP not configured; price drops will not be emailed"),
        }

        Ok(manager)
    }

    pub fn with_transport(mut self, transport: Arc<dyn NotificationTransport>) -> Self {
        self.dispatcher = Some(NotificationDispatcher::new(transport, self.store.clone()));
        self
    }

    pub fn with_default_recipient(mut self, recipient: Option<String>) -> Self {
        self.default_recipient = recipient;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.orchestrator = self.orchestrator.with_fetch_timeout(timeout);
        self
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    /// Resolve the URL, fetch the product once and start tracking it.
    pub async fn add_item(&self, request: AddItemRequest) -> Result<TrackedItem> {
        request.validate()?;
        let url = request.url.trim();

        let product = url_resolver::resolve_product(url)?;
        let strategy = self.registry.resolve_strategy(&product.domain);
        tracing::debug!(domain = %product.domain, handle = %product.handle, strategy = strategy.name(), "Adding item");

        let extracted = strategy.fetch_full(url, &product).await?;
        let item = self
            .store
            .create_item(NewItem::from_extraction(url, &product, extracted))
            .await?;

        tracing::info!(item_id = %item.id, domain = %item.store_domain, price = ?item.current_price, "Item added");
        Ok(item)
    }

    pub async fn list_items(&self) -> Result<Vec<TrackedItem>> {
        self.store.list_items().await
    }

    pub async fn get_item(&self, id: &str) -> Result<TrackedItem> {
        self.store.get_item(id).await?.ok_or_else(|| AppError::NotFound {
            resource: "Item".to_string(),
        })
    }

    pub async fn delete_item(&self, id: &str) -> Result<()> {
        if !self.store.delete_item(id).await? {
            return Err(AppError::NotFound {
                resource: "Item".to_string(),
            });
        }
        tracing::info!(item_id = %id, "Item removed");
        Ok(())
    }

    pub async fn set_setting(&self, key: &str, update: SettingUpdate) -> Result<SystemSetting> {
        if !SystemSetting::is_known_key(key) {
            return Err(AppError::NotFound {
                resource: format!("Setting {}", key),
            });
        }
        update.validate()?;

        let value = update.value.trim();
        if key == NOTIFICATION_EMAIL && !value.validate_email() {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }

        self.store.set_setting(key, value).await?;
        Ok(SystemSetting::new(key, value))
    }

    /// Stored setting first, then the configured fallback.
    pub async fn recipient(&self) -> Result<Option<String>> {
        match self.store.get_setting(NOTIFICATION_EMAIL).await? {
            Some(email) if !email.trim().is_empty() => Ok(Some(email)),
            _ => Ok(self.default_recipient.clone()),
        }
    }

    /// Refresh every item, alert on new drops and return the fresh state.
    pub async fn run_refresh_cycle(&self) -> Result<RefreshCycleSummary> {
        let items = self.store.list_items().await?;
        let report = self.orchestrator.refresh_all(items).await?;

        let notifications_sent = match &self.dispatcher {
            Some(dispatcher) if !report.drops.is_empty() => {
                let recipient = self.recipient().await?;
                dispatcher
                    .dispatch(&report.drops, recipient.as_deref())
                    .await?
                    .notifications_sent()
            }
            None if !report.drops.is_empty() => {
                tracing::info!(drops = report.drops.len(), "Price drops detected but no transport configured");
                0
            }
            _ => 0,
        };

        Ok(RefreshCycleSummary {
            items: self.store.list_items().await?,
            drops_detected: report.drops.len(),
            results: report.outcomes,
            notifications_sent,
        })
    }
}
