use thiserror::Error;

/// Failures raised while resolving a product URL or extracting product data
/// from a storefront. The display text is shown to users as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Invalid URL format.")]
    InvalidUrl(String),

    #[error("This store is not supported")]
    UnsupportedStore,

    #[error("Could not connect to {domain}.")]
    Connection { domain: String },

    #[error("{0}")]
    NotShopifyStore(String),

    #[error("No product variants found.")]
    NoVariants,

    #[error("Could not parse price: {0}")]
    InvalidPrice(String),

    #[error("Could not fetch {store} product")]
    StoreFetch { store: String },

    #[error("Could not parse {store} product data")]
    StoreParse { store: String },

    #[error("Timed out fetching from {domain}")]
    Timeout { domain: String },
}

impl ExtractionError {
    pub fn not_found() -> Self {
        ExtractionError::NotShopifyStore("Product not found or store unsupported".to_string())
    }

    pub fn blocked() -> Self {
        ExtractionError::NotShopifyStore("Store unsupported or blocking requests".to_string())
    }

    pub fn unsupported() -> Self {
        ExtractionError::NotShopifyStore("This store is not supported".to_string())
    }

    /// Errors caused by the input URL rather than by the remote store.
    pub fn is_input_error(&self) -> bool {
        matches!(self, ExtractionError::InvalidUrl(_) | ExtractionError::UnsupportedStore)
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("This product is already being monitored")]
    DuplicateUrl { url: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification used by the outer surfaces (HTTP, CLI).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    BadInput,
    NotFound,
    Unauthorized,
    Upstream,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::DuplicateUrl { .. } => ErrorKind::Conflict,
            AppError::Validation(_) => ErrorKind::BadInput,
            AppError::Extraction(e) if e.is_input_error() => ErrorKind::BadInput,
            AppError::Extraction(_) => ErrorKind::Upstream,
            AppError::NotFound { .. } => ErrorKind::NotFound,
            AppError::Unauthorized => ErrorKind::Unauthorized,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let message = err
            .field_errors()
            .values()
            .flat_map(|errors| errors.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| err.to_string());
        AppError::Validation(message)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
