pub mod config;
pub mod core;
pub mod item_manager;
pub mod models;
pub mod plugins;
pub mod scheduler;
pub mod scraper;
pub mod storage;
pub mod utils;
pub mod web;

// Re-export commonly used types
pub use config::AppConfig;
pub use item_manager::{AddItemRequest, ItemManager, SettingUpdate};
pub use models::{PriceDropEvent, RefreshCycleSummary, RefreshOutcome, TrackedItem};
pub use scheduler::RefreshScheduler;
pub use storage::ItemStore;
pub use utils::error::{AppError, ErrorKind, ExtractionError};

pub type Result<T> = std::result::Result<T, AppError>;
