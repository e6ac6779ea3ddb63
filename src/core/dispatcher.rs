use std::sync::Arc;

use crate::core::price::format_cents;
use crate::core::url_resolver::store_name;
use crate::models::PriceDropEvent;
use crate::plugins::NotificationTransport;
use crate::storage::ItemStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing to send, or nobody to send it to.
    Skipped,
    /// Message delivered; `advanced` items had their notified price lowered.
    Sent { drops: usize, advanced: usize },
    /// Delivery failed; no notified price was touched.
    Failed(String),
}

impl DispatchOutcome {
    pub fn notifications_sent(&self) -> usize {
        match self {
            DispatchOutcome::Sent { drops, .. } => *drops,
            _ => 0,
        }
    }
}

/// Batches price drops into one alert and records them as notified.
pub struct NotificationDispatcher {
    transport: Arc<dyn NotificationTransport>,
    store: Arc<dyn ItemStore>,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn NotificationTransport>, store: Arc<dyn ItemStore>) -> Self {
        Self { transport, store }
    }

    /// Send one message covering every drop, then advance notified prices.
    ///
    /// Notified prices move only after the send succeeds, so a failed send
    /// leaves every drop qualifying again on the next cycle.
    pub async fn dispatch(&self, drops: &[PriceDropEvent], recipient: Option<&str>) -> crate::Result<DispatchOutcome> {
        let recipient = match recipient.map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => {
                if !drops.is_empty() {
                    tracing::info!(drops = drops.len(), "No notification recipient configured");
                }
                return Ok(DispatchOutcome::Skipped);
            }
        };
        if drops.is_empty() {
            return Ok(DispatchOutcome::Skipped);
        }

        let subject = format_subject(drops);
        let body = format_body(drops);

        if let Err(e) = self.transport.send(recipient, &subject, &body).await {
            tracing::warn!(drops = drops.len(), error = %e, "Price drop notification failed");
            metrics::counter!("watcher_notifications_total", "status" => "failed").increment(1);
            return Ok(DispatchOutcome::Failed(e));
        }
        metrics::counter!("watcher_notifications_total", "status" => "sent").increment(1);

        let mut advanced = 0;
        for drop in drops {
            if self.store.update_notified_price(&drop.item_id, drop.new_price).await? {
                advanced += 1;
            }
        }

        tracing::info!(drops = drops.len(), advanced, "Price drop notification sent");
        Ok(DispatchOutcome::Sent {
            drops: drops.len(),
            advanced,
        })
    }
}

pub fn format_subject(drops: &[PriceDropEvent]) -> String {
    match drops {
        [single] => format!("Price drop: {}", single.title),
        _ => format!("{} price drops detected", drops.len()),
    }
}

pub fn format_body(drops: &[PriceDropEvent]) -> String {
    let mut body = String::from("Prices dropped on items you are watching:\n");
    for drop in drops {
        body.push_str(&format!(
            "\n{} ({})\n  {} -> {} ({}% off)\n  {}\n",
            drop.title,
            store_name(&drop.store_domain),
            format_cents(drop.old_price),
            format_cents(drop.new_price),
            drop.percent_off,
            drop.url
        ));
    }
    body
}
