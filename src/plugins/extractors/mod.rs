// Extraction strategy implementations
pub mod meta_tag;
pub mod shopify;

pub use meta_tag::{extract_meta_content, MetaProperty, MetaTagStore, MetaTagStrategy};
pub use shopify::ShopifyJsonStrategy;
