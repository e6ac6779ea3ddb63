// API endpoint integration tests

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::*;

#[tokio::test]
async fn test_health_endpoint() -> anyhow::Result<()> {
    let app = create_test_app(None);
    let response = make_request(app.router(), Method::GET, "/health", None, None).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "storefront-watcher");
    Ok(())
}

#[tokio::test]
async fn test_add_list_delete_items() -> anyhow::Result<()> {
    let app = create_test_app(None);
    app.http.product("shop.example.com", "oxford-shirt", "Oxford Shirt", "129.00");

    let response = make_request(
        app.router(),
        Method::POST,
        "/api/items",
        Some(json!({ "url": "https://shop.example.com/products/oxford-shirt" })),
        None,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["current_price"], 12900);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let response = make_request(app.router(), Method::GET, "/api/items", None, None).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Oxford Shirt");

    let uri = format!("/api/items/{id}");
    let response = make_request(app.router(), Method::DELETE, &uri, None, None).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = make_request(app.router(), Method::DELETE, &uri, None, None).await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await?;
    assert_eq!(body["error"]["message"], "Item not found");

    Ok(())
}

#[tokio::test]
async fn test_add_item_error_responses() -> anyhow::Result<()> {
    let app = create_test_app(None);
    app.http.product("shop.example.com", "tee", "Tee", "20.00");

    // missing url
    let response = make_request(app.router(), Method::POST, "/api/items", Some(json!({})), None).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await?["error"]["message"], "URL is required");

    // wrong type
    let response = make_request(app.router(), Method::POST, "/api/items", Some(json!({ "url": 5 })), None).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // no product handle
    let response = make_request(
        app.router(),
        Method::POST,
        "/api/items",
        Some(json!({ "url": "https://shop.example.com/pages/about" })),
        None,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await?["error"]["message"], "This store is not supported");

    // unreachable store keeps the specific reason
    let response = make_request(
        app.router(),
        Method::POST,
        "/api/items",
        Some(json!({ "url": "https://down.example.com/products/tee" })),
        None,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await?["error"]["message"],
        "Could not connect to down.example.com."
    );

    // duplicate
    let add = json!({ "url": "https://shop.example.com/products/tee" });
    let response = make_request(app.router(), Method::POST, "/api/items", Some(add.clone()), None).await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = make_request(app.router(), Method::POST, "/api/items", Some(add), None).await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(response).await?["error"]["message"],
        "This product is already being monitored"
    );

    Ok(())
}

#[tokio::test]
async fn test_scheduled_refresh_requires_secret() -> anyhow::Result<()> {
    let app = create_test_app(Some(CRON_SECRET));
    app.http.product("shop.example.com", "tee", "Tee", "20.00");
    app.items
        .add_item(storefront_watcher::AddItemRequest {
            url: "https://shop.example.com/products/tee".to_string(),
        })
        .await?;
    let before = app.http.request_count();

    let response = make_request(app.router(), Method::GET, "/api/refresh", None, None).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = make_request(app.router(), Method::GET, "/api/refresh", None, Some("wrong")).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // rejected before any storefront was contacted
    assert_eq!(app.http.request_count(), before);

    let response = make_request(app.router(), Method::GET, "/api/refresh", None, Some(CRON_SECRET)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["results"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["results"][0]["success"], true);
    assert_eq!(body["data"]["drops_detected"], 0);
    assert_eq!(app.http.request_count(), before + 1);

    Ok(())
}

#[tokio::test]
async fn test_scheduled_refresh_rejected_without_configured_secret() -> anyhow::Result<()> {
    let app = create_test_app(None);
    let response = make_request(app.router(), Method::GET, "/api/refresh", None, Some("anything")).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_manual_refresh_needs_no_secret() -> anyhow::Result<()> {
    let app = create_test_app(Some(CRON_SECRET));
    app.http.product("shop.example.com", "tee", "Tee", "20.00");
    app.items
        .add_item(storefront_watcher::AddItemRequest {
            url: "https://shop.example.com/products/tee".to_string(),
        })
        .await?;
    app.http.product("shop.example.com", "tee", "Tee", "15.00");

    let response = make_request(app.router(), Method::POST, "/api/refresh", None, None).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    assert_eq!(body["data"]["drops_detected"], 1);
    assert_eq!(body["data"]["notifications_sent"], 1);
    assert_eq!(body["data"]["items"][0]["current_price"], 1500);
    assert_eq!(body["data"]["items"][0]["notified_price"], 1500);

    Ok(())
}

#[tokio::test]
async fn test_update_notification_email() -> anyhow::Result<()> {
    let app = create_test_app(None);

    let response = make_request(
        app.router(),
        Method::PUT,
        "/api/settings/notification_email",
        Some(json!({ "value": "alerts@example.com" })),
        None,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.items.recipient().await?.as_deref(),
        Some("alerts@example.com")
    );

    let response = make_request(
        app.router(),
        Method::PUT,
        "/api/settings/notification_email",
        Some(json!({ "value": "not-an-email" })),
        None,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = make_request(
        app.router(),
        Method::PUT,
        "/api/settings/unknown_key",
        Some(json!({ "value": "x" })),
        None,
    )
    .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_requests() -> anyhow::Result<()> {
    let app = create_test_app(None);
    let router = app.router();

    let futures = (0..10).map(|_| make_request(router.clone(), Method::GET, "/api/items", None, None));
    let results = futures::future::try_join_all(futures).await?;

    for result in results {
        assert_eq!(result.status(), StatusCode::OK);
    }
    Ok(())
}
