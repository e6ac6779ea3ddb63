use axum::{
    middleware::from_fn_with_state,
    response::Json,
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{item_manager::ItemManager, AppConfig};

pub mod handlers;
pub mod middleware;
pub mod responses;

pub use handlers::{add_item, delete_item, list_items, manual_refresh, scheduled_refresh, update_setting};
pub use middleware::require_cron_secret;
pub use responses::*;

#[derive(Clone)]
pub struct AppState {
    pub items: Arc<ItemManager>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(items: Arc<ItemManager>, config: AppConfig) -> Self {
        Self {
            items,
            config: Arc::new(config),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(add_item))
        .route("/items/:id", delete(delete_item))
        // The secret check only guards the scheduled (GET) trigger.
        .route(
            "/refresh",
            get(scheduled_refresh)
                .route_layer(from_fn_with_state(state, require_cron_secret))
                .post(manual_refresh),
        )
        .route("/settings/:key", put(update_setting))
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "storefront-watcher"
    }))
}
