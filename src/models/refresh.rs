use serde::{Deserialize, Serialize};

use crate::models::TrackedItem;

/// Product snapshot returned by any extraction strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionResult {
    pub handle: String,
    pub store_domain: String,
    pub title: String,
    pub image_url: String,
    pub price: i64,
}

/// Per-item result of one refresh cycle. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshOutcome {
    pub item_id: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshOutcome {
    pub fn succeeded(item_id: impl Into<String>, new_price: i64) -> Self {
        Self {
            item_id: item_id.into(),
            success: true,
            new_price: Some(new_price),
            error: None,
        }
    }

    pub fn failed(item_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            success: false,
            new_price: None,
            error: Some(error.into()),
        }
    }
}

/// A qualifying price drop, consumed by the notification dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceDropEvent {
    pub item_id: String,
    pub title: String,
    pub old_price: i64,
    pub new_price: i64,
    pub url: String,
    pub store_domain: String,
    pub percent_off: i64,
}

/// Everything one pass of the refresh orchestrator produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefreshReport {
    pub items: Vec<TrackedItem>,
    pub outcomes: Vec<RefreshOutcome>,
    pub drops: Vec<PriceDropEvent>,
}

impl RefreshReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.success).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// What the trigger surface returns after a full cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshCycleSummary {
    pub items: Vec<TrackedItem>,
    pub results: Vec<RefreshOutcome>,
    pub drops_detected: usize,
    pub notifications_sent: usize,
}
