pub mod extractors;
pub mod notifiers;
pub mod registry;
pub mod traits;

pub use registry::StrategyRegistry;
pub use traits::{ExtractionStrategy, NotificationTransport};
