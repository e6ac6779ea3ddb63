pub mod dispatcher;
pub mod price;
pub mod price_drop;
pub mod refresh;
pub mod url_resolver;

pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use refresh::RefreshOrchestrator;
