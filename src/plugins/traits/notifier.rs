use async_trait::async_trait;

/// Trait for implementing notification transports (email, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Deliver one message. An `Err` means nothing was delivered.
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), String>;
}
