// Refresh cycles: fault isolation, drop detection and notification dedup

use storefront_watcher::{storage::ItemStore, AddItemRequest, TrackedItem};

use super::*;

async fn track(app: &TestApp, domain: &str, handle: &str, price: &str) -> anyhow::Result<TrackedItem> {
    app.http.product(domain, handle, handle, price);
    Ok(app
        .items
        .add_item(AddItemRequest {
            url: format!("https://{domain}/products/{handle}"),
        })
        .await?)
}

#[tokio::test]
async fn test_price_drop_lifecycle() -> anyhow::Result<()> {
    let app = create_test_app(None);
    let item = track(&app, "shop.example.com", "oxford-shirt", "100.00").await?;

    // first drop: alert once
    app.http.product("shop.example.com", "oxford-shirt", "oxford-shirt", "80.00");
    let summary = app.items.run_refresh_cycle().await?;
    assert_eq!(summary.drops_detected, 1);
    assert_eq!(summary.notifications_sent, 1);
    assert_eq!(app.transport.sent_count(), 1);
    {
        let sent = app.transport.sent.lock().unwrap();
        let (recipient, subject, body) = &sent[0];
        assert_eq!(recipient, RECIPIENT);
        assert_eq!(subject, "Price drop: oxford-shirt");
        assert!(body.contains("$100.00 -> $80.00 (20% off)"));
        assert!(body.contains("https://shop.example.com/products/oxford-shirt"));
    }

    // same price again: no repeat
    let summary = app.items.run_refresh_cycle().await?;
    assert_eq!(summary.drops_detected, 0);
    assert_eq!(app.transport.sent_count(), 1);

    // further drop: alert again
    app.http.product("shop.example.com", "oxford-shirt", "oxford-shirt", "70.00");
    let summary = app.items.run_refresh_cycle().await?;
    assert_eq!(summary.drops_detected, 1);
    assert_eq!(app.transport.sent_count(), 2);
    assert!(app.transport.sent.lock().unwrap()[1].2.contains("(30% off)"));

    // back above original: nothing
    app.http.product("shop.example.com", "oxford-shirt", "oxford-shirt", "110.00");
    let summary = app.items.run_refresh_cycle().await?;
    assert_eq!(summary.drops_detected, 0);

    let stored = app.store.get_item(&item.id).await?.unwrap();
    assert_eq!(stored.original_price, Some(10000));
    assert_eq!(stored.current_price, Some(11000));
    assert_eq!(stored.notified_price, Some(7000));

    Ok(())
}

#[tokio::test]
async fn test_one_broken_store_does_not_affect_others() -> anyhow::Result<()> {
    let app = create_test_app(None);
    let a = track(&app, "a.example.com", "tee", "20.00").await?;
    let broken = track(&app, "broken.example.com", "tee", "30.00").await?;
    let c = track(&app, "c.example.com", "tee", "40.00").await?;

    app.http.product("a.example.com", "tee", "tee", "18.00");
    app.http.unreachable("https://broken.example.com/products/tee.json");
    app.http.product("c.example.com", "tee", "tee", "41.00");

    let summary = app.items.run_refresh_cycle().await?;
    assert_eq!(summary.results.len(), 3);

    let outcome = |id: &str| summary.results.iter().find(|o| o.item_id == id).unwrap().clone();
    assert!(outcome(&a.id).success);
    assert_eq!(outcome(&a.id).new_price, Some(1800));
    assert!(outcome(&c.id).success);

    let failed = outcome(&broken.id);
    assert!(!failed.success);
    assert_eq!(failed.error.as_deref(), Some("Could not connect to broken.example.com."));

    let stored = app.store.get_item(&broken.id).await?.unwrap();
    assert_eq!(stored.current_price, Some(3000));

    let listed: Vec<_> = summary.items.iter().map(|i| (i.id.clone(), i.current_price)).collect();
    assert!(listed.contains(&(a.id.clone(), Some(1800))));
    assert!(listed.contains(&(c.id.clone(), Some(4100))));
    assert_eq!(summary.drops_detected, 1);

    Ok(())
}

#[tokio::test]
async fn test_failed_send_is_retried_next_cycle() -> anyhow::Result<()> {
    let app = create_test_app(None);
    let item = track(&app, "shop.example.com", "coat", "200.00").await?;

    app.http.product("shop.example.com", "coat", "coat", "150.00");
    app.transport.set_failing(true);

    let summary = app.items.run_refresh_cycle().await?;
    assert_eq!(summary.drops_detected, 1);
    assert_eq!(summary.notifications_sent, 0);
    assert_eq!(app.store.get_item(&item.id).await?.unwrap().notified_price, None);

    app.transport.set_failing(false);
    let summary = app.items.run_refresh_cycle().await?;
    assert_eq!(summary.drops_detected, 1);
    assert_eq!(summary.notifications_sent, 1);
    assert_eq!(app.store.get_item(&item.id).await?.unwrap().notified_price, Some(15000));

    Ok(())
}

#[tokio::test]
async fn test_multiple_drops_batched_into_one_message() -> anyhow::Result<()> {
    let app = create_test_app(None);
    track(&app, "a.example.com", "tee", "20.00").await?;
    track(&app, "b.example.com", "hat", "30.00").await?;

    app.http.product("a.example.com", "tee", "tee", "10.00");
    app.http.product("b.example.com", "hat", "hat", "15.00");

    let summary = app.items.run_refresh_cycle().await?;
    assert_eq!(summary.drops_detected, 2);
    assert_eq!(summary.notifications_sent, 2);
    assert_eq!(app.transport.sent_count(), 1);

    let sent = app.transport.sent.lock().unwrap();
    assert_eq!(sent[0].1, "2 price drops detected");
    assert!(sent[0].2.contains("tee (a)"));
    assert!(sent[0].2.contains("hat (b)"));

    Ok(())
}

#[tokio::test]
async fn test_stored_recipient_overrides_config() -> anyhow::Result<()> {
    let app = create_test_app(None);
    track(&app, "shop.example.com", "tee", "20.00").await?;
    app.store.set_setting("notification_email", "other@example.com").await?;

    app.http.product("shop.example.com", "tee", "tee", "10.00");
    app.items.run_refresh_cycle().await?;

    assert_eq!(app.transport.sent.lock().unwrap()[0].0, "other@example.com");
    Ok(())
}
