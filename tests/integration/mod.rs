// Integration tests for Storefront Watcher
// These tests drive the item manager and the HTTP surface against scripted storefronts

pub mod add_item_tests;
pub mod api_tests;
pub mod refresh_cycle_tests;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request},
    response::Response,
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use storefront_watcher::{
    config::{
        DatabaseConfig, LoggingConfig, MetricsConfig, NotificationsConfig, SchedulerConfig, ScraperConfig,
        SecurityConfig, ServerConfig,
    },
    plugins::{NotificationTransport, StrategyRegistry},
    scraper::{HttpClient, HttpClientError, HttpResponse},
    storage::MemoryStore,
    web::{create_router, AppState},
    AppConfig, ItemManager,
};

pub const CRON_SECRET: &str = "integration-cron-secret";
pub const RECIPIENT: &str = "me@example.com";
pub const USER_AGENT: &str = "StorefrontWatcher-Test/1.0";

/// Test configuration for integration tests
pub fn get_test_config(cron_secret: Option<&str>) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        },
        database: DatabaseConfig {
            url: "memory://".to_string(),
            max_connections: 1,
        },
        security: SecurityConfig {
            cron_secret: cron_secret.map(str::to_string),
        },
        scraper: ScraperConfig {
            user_agent: USER_AGENT.to_string(),
            request_timeout_secs: 5,
            refresh_timeout_secs: 5,
        },
        scheduler: SchedulerConfig {
            enabled: false,
            cron: "0 0 */6 * * *".to_string(),
        },
        notifications: NotificationsConfig {
            recipient: Some(RECIPIENT.to_string()),
            smtp: None,
        },
        metrics: MetricsConfig {
            enabled: false,
            port: 9001,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            directory: None,
        },
    }
}

/// Storefront double: canned responses by URL, every other URL is unreachable.
#[derive(Default)]
pub struct ScriptedHttp {
    responses: Mutex<HashMap<String, HttpResponse>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedHttp {
    pub fn respond(&self, url: &str, status: u16, body: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), HttpResponse::new(status, body));
    }

    pub fn product(&self, domain: &str, handle: &str, title: &str, price: &str) {
        let url = format!("https://{domain}/products/{handle}.json");
        self.respond(&url, 200, shopify_product_json(title, price));
    }

    pub fn unreachable(&self, url: &str) {
        self.responses.lock().unwrap().remove(url);
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttp {
    async fn get(&self, url: &str, _headers: &[(&str, &str)]) -> Result<HttpResponse, HttpClientError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| HttpClientError::Connection(format!("no route to {url}")))
    }
}

/// Records every message; fails while `failing` is set.
#[derive(Default)]
pub struct RecordingTransport {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub failing: Mutex<bool>,
}

impl RecordingTransport {
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), String> {
        if *self.failing.lock().unwrap() {
            return Err("SMTP connection refused".to_string());
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

pub fn shopify_product_json(title: &str, price: &str) -> String {
    serde_json::json!({
        "product": {
            "title": title,
            "variants": [{ "price": price }],
            "images": [{ "src": format!("https://cdn.example.com/{}.jpg", title.to_lowercase().replace(' ', "-")) }]
        }
    })
    .to_string()
}

pub struct TestApp {
    pub http: Arc<ScriptedHttp>,
    pub transport: Arc<RecordingTransport>,
    pub store: Arc<MemoryStore>,
    pub items: Arc<ItemManager>,
    pub state: AppState,
}

impl TestApp {
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }
}

/// Create a fully wired app over scripted storefronts and an in-memory store
pub fn create_test_app(cron_secret: Option<&str>) -> TestApp {
    let config = get_test_config(cron_secret);
    let http = Arc::new(ScriptedHttp::default());
    let transport = Arc::new(RecordingTransport::default());
    let store = Arc::new(MemoryStore::new());

    let registry = StrategyRegistry::with_default_strategies(http.clone(), USER_AGENT);
    let items = Arc::new(
        ItemManager::new(Arc::new(registry), store.clone())
            .with_transport(transport.clone())
            .with_default_recipient(config.notifications.recipient.clone()),
    );

    TestApp {
        http,
        transport,
        store,
        items: items.clone(),
        state: AppState::new(items, config),
    }
}

/// Helper to make HTTP requests to the test app
pub async fn make_request(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    bearer: Option<&str>,
) -> anyhow::Result<Response> {
    let mut request = Request::builder().method(method).uri(uri);

    if body.is_some() {
        request = request.header("content-type", "application/json");
    }
    if let Some(token) = bearer {
        request = request.header("authorization", format!("Bearer {token}"));
    }

    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    Ok(app.oneshot(request.body(body)?).await?)
}

pub async fn body_json(response: Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
