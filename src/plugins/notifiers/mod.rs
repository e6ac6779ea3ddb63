// Notification transport implementations
pub mod email;

pub use email::EmailTransport;
