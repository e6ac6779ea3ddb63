// Adding items through the manager, across store strategies and failure modes

use storefront_watcher::{AddItemRequest, AppError, ErrorKind, ExtractionError};

use super::*;

fn add(url: &str) -> AddItemRequest {
    AddItemRequest { url: url.to_string() }
}

#[tokio::test]
async fn test_add_shopify_item() -> anyhow::Result<()> {
    let app = create_test_app(None);
    app.http.product("shop.example.com", "oxford-shirt", "Oxford Shirt", "129.00");

    let item = app
        .items
        .add_item(add("https://shop.example.com/products/oxford-shirt?variant=42"))
        .await?;

    assert_eq!(item.store_domain, "shop.example.com");
    assert_eq!(item.handle, "oxford-shirt");
    assert_eq!(item.title.as_deref(), Some("Oxford Shirt"));
    assert_eq!(item.image_url.as_deref(), Some("https://cdn.example.com/oxford-shirt.jpg"));
    assert_eq!(item.original_price, Some(12900));
    assert_eq!(item.current_price, Some(12900));
    assert_eq!(item.notified_price, None);
    assert_eq!(item.url, "https://shop.example.com/products/oxford-shirt?variant=42");

    Ok(())
}

#[tokio::test]
async fn test_add_buck_mason_item_uses_meta_tags() -> anyhow::Result<()> {
    let app = create_test_app(None);
    let url = "https://www.buckmason.com/products/slub-tee";
    app.http.respond(
        url,
        200,
        r#"<html><head>
            <meta property="og:title" content="Slub Tee - Buck Mason- Modern American Classics">
            <meta property="og:image" content="https://cdn.buckmason.com/slub.jpg">
            <meta property="product:price:amount" content="48.00">
        </head></html>"#,
    );

    let item = app.items.add_item(add(url)).await?;
    assert_eq!(item.title.as_deref(), Some("Slub Tee"));
    assert_eq!(item.current_price, Some(4800));
    assert_eq!(item.store_domain, "www.buckmason.com");

    Ok(())
}

#[tokio::test]
async fn test_add_duplicate_url() -> anyhow::Result<()> {
    let app = create_test_app(None);
    app.http.product("shop.example.com", "tee", "Tee", "20.00");

    app.items.add_item(add("https://shop.example.com/products/tee")).await?;
    let err = app
        .items
        .add_item(add("https://shop.example.com/products/tee"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateUrl { .. }));
    assert_eq!(err.to_string(), "This product is already being monitored");
    assert_eq!(app.items.list_items().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_add_item_failure_reasons() -> anyhow::Result<()> {
    let app = create_test_app(None);

    let err = app.items.add_item(add("not a url")).await.unwrap_err();
    assert!(matches!(err, AppError::Extraction(ExtractionError::InvalidUrl(_))));
    assert_eq!(err.to_string(), "Invalid URL format.");

    let err = app
        .items
        .add_item(add("https://shop.example.com/collections/shirts"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "This store is not supported");
    assert_eq!(err.kind(), ErrorKind::BadInput);

    // nothing scripted: unreachable
    let err = app
        .items
        .add_item(add("https://down.example.com/products/tee"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Could not connect to down.example.com.");
    assert_eq!(err.kind(), ErrorKind::Upstream);

    app.http
        .respond("https://gone.example.com/products/tee.json", 404, "Not Found");
    let err = app
        .items
        .add_item(add("https://gone.example.com/products/tee"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Product not found or store unsupported");

    app.http.respond(
        "https://empty.example.com/products/gift-card.json",
        200,
        r#"{"product":{"title":"Gift Card","variants":[]}}"#,
    );
    let err = app
        .items
        .add_item(add("https://empty.example.com/products/gift-card"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "No product variants found.");

    assert!(app.items.list_items().await?.is_empty());
    Ok(())
}
