pub mod extractor;
pub mod notifier;

pub use extractor::ExtractionStrategy;
pub use notifier::NotificationTransport;
#[cfg(test)]
pub use notifier::MockNotificationTransport;
