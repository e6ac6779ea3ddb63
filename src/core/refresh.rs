//! Concurrent price refresh over a set of tracked items.
//!
//! Every item gets its own task. A failing store only marks its own item as
//! failed; the batch as a whole aborts only when storage itself fails.

use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::core::price_drop;
use crate::models::{PriceDropEvent, RefreshOutcome, RefreshReport, TrackedItem};
use crate::plugins::StrategyRegistry;
use crate::storage::ItemStore;
use crate::utils::error::{AppError, ExtractionError};

/// What one item's task produced.
#[derive(Debug)]
struct ItemRefresh {
    outcome: RefreshOutcome,
    drop: Option<PriceDropEvent>,
}

#[derive(Clone)]
pub struct RefreshOrchestrator {
    registry: Arc<StrategyRegistry>,
    store: Arc<dyn ItemStore>,
    fetch_timeout: Option<Duration>,
}

impl RefreshOrchestrator {
    pub fn new(registry: Arc<StrategyRegistry>, store: Arc<dyn ItemStore>) -> Self {
        Self {
            registry,
            store,
            fetch_timeout: None,
        }
    }

    /// Fail any single item whose fetch runs longer than `timeout`.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    pub async fn refresh_all(&self, items: Vec<TrackedItem>) -> crate::Result<RefreshReport> {
        let started = Instant::now();
        tracing::info!(items = items.len(), "Starting price refresh");

        let handles: Vec<(String, JoinHandle<crate::Result<ItemRefresh>>)> = items
            .iter()
            .map(|item| {
                let worker = self.clone();
                let item = item.clone();
                (item.id.clone(), tokio::spawn(async move { worker.refresh_one(item).await }))
            })
            .collect();

        let (ids, handles): (Vec<String>, Vec<_>) = handles.into_iter().unzip();
        let joined = join_all(handles).await;

        let mut report = RefreshReport::default();
        let mut storage_failure: Option<AppError> = None;

        for (id, result) in ids.into_iter().zip(joined) {
            match result {
                Ok(Ok(refresh)) => {
                    if let Some(drop) = refresh.drop {
                        report.drops.push(drop);
                    }
                    report.outcomes.push(refresh.outcome);
                }
                Ok(Err(e)) => {
                    tracing::error!(item_id = %id, error = %e, "Storage failed during refresh");
                    report.outcomes.push(RefreshOutcome::failed(&id, e.to_string()));
                    storage_failure.get_or_insert(e);
                }
                Err(join_error) => {
                    tracing::error!(item_id = %id, error = %join_error, "Refresh task panicked");
                    report.outcomes.push(RefreshOutcome::failed(&id, "Unknown error"));
                }
            }
        }

        if let Some(e) = storage_failure {
            return Err(e);
        }

        report.items = items
            .into_iter()
            .map(|mut item| {
                let fresh = report
                    .outcomes
                    .iter()
                    .find(|o| o.item_id == item.id)
                    .and_then(|o| o.new_price);
                if let Some(price) = fresh {
                    item.current_price = Some(price);
                }
                item
            })
            .collect();

        metrics::histogram!("watcher_refresh_cycle_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(
            succeeded = report.succeeded(),
            failed = report.failed(),
            drops = report.drops.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Price refresh finished"
        );

        Ok(report)
    }

    async fn refresh_one(&self, item: TrackedItem) -> crate::Result<ItemRefresh> {
        let product = item.product_ref();
        let strategy = self.registry.resolve_strategy(&product.domain);

        let fetched = match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, strategy.fetch_price(&product)).await {
                Ok(result) => result,
                Err(_) => Err(ExtractionError::Timeout {
                    domain: product.domain.clone(),
                }),
            },
            None => strategy.fetch_price(&product).await,
        };

        let new_price = match fetched {
            Ok(price) => price,
            Err(e) => {
                tracing::warn!(item_id = %item.id, domain = %product.domain, strategy = strategy.name(), error = %e, "Price fetch failed");
                metrics::counter!("watcher_refresh_items_total", "status" => "failed").increment(1);
                return Ok(ItemRefresh {
                    outcome: RefreshOutcome::failed(&item.id, e.to_string()),
                    drop: None,
                });
            }
        };

        // Evaluated against the stored state before it is overwritten.
        let drop = price_drop::detect(&item, new_price);

        match self.store.update_current_price(&item.id, new_price).await {
            Ok(()) => {}
            // Deleted after the cycle listed it; only this item is affected.
            Err(AppError::NotFound { .. }) => {
                tracing::info!(item_id = %item.id, "Item removed during refresh");
                metrics::counter!("watcher_refresh_items_total", "status" => "failed").increment(1);
                return Ok(ItemRefresh {
                    outcome: RefreshOutcome::failed(&item.id, "Item no longer tracked"),
                    drop: None,
                });
            }
            Err(e) => return Err(e),
        }
        if let Some(event) = &drop {
            tracing::info!(item_id = %item.id, old = event.old_price, new = event.new_price, percent_off = event.percent_off, "Price drop detected");
            metrics::counter!("watcher_price_drops_total").increment(1);
        }
        metrics::counter!("watcher_refresh_items_total", "status" => "success").increment(1);

        Ok(ItemRefresh {
            outcome: RefreshOutcome::succeeded(&item.id, new_price),
            drop,
        })
    }
}
