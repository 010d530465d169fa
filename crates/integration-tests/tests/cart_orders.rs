//! Integration tests for the cart and the order placement flow.
//!
//! These tests require:
//! - A running `PostgreSQL` database, migrated (tienda-cli migrate)
//! - The API server running (cargo run -p tienda-api)
//! - A pre-created administrator (see the tienda-integration-tests docs)
//!
//! Run with: cargo test -p tienda-integration-tests -- --ignored

use serde_json::{Value, json};

use tienda_integration_tests::{TestContext, decimal_as_f64};

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn adding_same_product_twice_accumulates_one_line() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 50).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("cart"))
        .await;

    let first = ctx.add_to_cart(&token, product, 2).await;
    assert_eq!(first.status(), 200);

    let second = ctx.add_to_cart(&token, product, 3).await;
    assert_eq!(second.status(), 200);

    let body: Value = second.json().await.expect("cart body");
    let items = body["data"]["items"].as_array().expect("items");

    // One line, quantity 2 + 3, never two lines
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], json!(5));
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn invalid_batch_is_rejected_whole_with_offending_index() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 50).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("cart"))
        .await;

    // Second item has a bad quantity; the whole batch must be rejected
    let resp = ctx
        .client
        .post(format!("{}/cart", ctx.base_url))
        .bearer_auth(&token)
        .json(&json!([
            {"product_id": product, "quantity": 1},
            {"product_id": product, "quantity": 0},
        ]))
        .send()
        .await
        .expect("request failed");

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("body");
    assert!(
        body["error"]["message"]
            .as_str()
            .expect("message")
            .contains("index 1")
    );

    // No partial application: the cart is still empty
    let cart = ctx
        .client
        .get(format!("{}/cart", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    let cart: Value = cart.json().await.expect("cart body");
    assert_eq!(cart["data"]["items"].as_array().expect("items").len(), 0);
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn order_snapshots_totals_stock_and_cart() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;

    // (P1, price 10, qty 2) and (P2, price 5, qty 3) => total 35
    let p1 = ctx.create_product(&admin, category, "10.00", 20).await;
    let p2 = ctx.create_product(&admin, category, "5.00", 20).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("order"))
        .await;
    assert_eq!(ctx.add_to_cart(&token, p1, 2).await.status(), 200);
    assert_eq!(ctx.add_to_cart(&token, p2, 3).await.status(), 200);

    let resp = ctx.place_order(&token).await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("order body");
    let order = &body["data"];

    assert_eq!(order["status"], json!("pending"));
    assert!((decimal_as_f64(&order["total"]) - 35.0).abs() < f64::EPSILON);

    let items = order["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert!((decimal_as_f64(&items[0]["subtotal"]) - 20.0).abs() < f64::EPSILON);
    assert!((decimal_as_f64(&items[1]["subtotal"]) - 15.0).abs() < f64::EPSILON);

    // Stock decremented by the ordered quantities
    assert_eq!(ctx.product_stock(p1).await, 18);
    assert_eq!(ctx.product_stock(p2).await, 17);

    // Cart is empty afterward
    let cart = ctx
        .client
        .get(format!("{}/cart", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    let cart: Value = cart.json().await.expect("cart body");
    assert_eq!(cart["data"]["items"].as_array().expect("items").len(), 0);
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn order_snapshot_is_immune_to_later_price_changes() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 20).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("order"))
        .await;
    ctx.add_to_cart(&token, product, 1).await;
    let placed = ctx.place_order(&token).await;
    assert_eq!(placed.status(), 201);
    let placed: Value = placed.json().await.expect("order body");
    let user_id = placed["data"]["user_id"].as_i64().expect("user id");

    // Reprice the product after the fact
    let repriced = ctx
        .client
        .patch(format!("{}/products/{product}", ctx.base_url))
        .bearer_auth(&admin)
        .json(&json!({"price": "99.00"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(repriced.status(), 200);

    // The historical order still carries the old unit price
    let orders = ctx
        .client
        .get(format!("{}/ordenes/user/{user_id}", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    let orders: Value = orders.json().await.expect("orders body");
    let latest = &orders["data"].as_array().expect("orders")[0];
    assert!((decimal_as_f64(&latest["items"][0]["unit_price"]) - 10.0).abs() < f64::EPSILON);
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn insufficient_stock_rejects_without_side_effects() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 3).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("order"))
        .await;
    assert_eq!(ctx.add_to_cart(&token, product, 5).await.status(), 200);

    let resp = ctx.place_order(&token).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("body");
    assert!(
        body["error"]["message"]
            .as_str()
            .expect("message")
            .contains("insufficient stock")
    );

    // No order persisted, no stock altered
    let me = ctx
        .client
        .get(format!("{}/users/me", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    let me: Value = me.json().await.expect("me body");
    let user_id = me["data"]["id"].as_i64().expect("user id");

    let orders = ctx
        .client
        .get(format!("{}/ordenes/user/{user_id}", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    let orders: Value = orders.json().await.expect("orders body");
    assert_eq!(orders["count"], json!(0));
    assert_eq!(ctx.product_stock(product).await, 3);
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn concurrent_orders_never_drive_stock_negative() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;

    // One unit, two hungry buyers
    let product = ctx.create_product(&admin, category, "10.00", 1).await;

    let buyer_a = ctx
        .register_customer(&TestContext::unique_email("race-a"))
        .await;
    let buyer_b = ctx
        .register_customer(&TestContext::unique_email("race-b"))
        .await;

    ctx.add_to_cart(&buyer_a, product, 1).await;
    ctx.add_to_cart(&buyer_b, product, 1).await;

    let (resp_a, resp_b) = tokio::join!(ctx.place_order(&buyer_a), ctx.place_order(&buyer_b));

    let statuses = [resp_a.status().as_u16(), resp_b.status().as_u16()];
    let successes = statuses.iter().filter(|s| **s == 201).count();
    let rejections = statuses.iter().filter(|s| **s == 400).count();

    // The guarded decrement inside the order transaction lets exactly one
    // racer through; the loser's whole order rolls back.
    assert_eq!(successes, 1, "exactly one order should be placed");
    assert_eq!(rejections, 1, "the other order should be rejected");
    assert_eq!(ctx.product_stock(product).await, 0);
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn removing_absent_product_is_a_noop_but_missing_cart_is_404() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 5).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("cart"))
        .await;

    // No cart exists yet: removing from it is NotFound
    let no_cart = ctx
        .client
        .delete(format!("{}/cart/{product}", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(no_cart.status(), 404);

    // Materialize the cart, then removing an absent product is a no-op
    ctx.add_to_cart(&token, product, 1).await;
    let noop = ctx
        .client
        .delete(format!("{}/cart/999999", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(noop.status(), 200);
    let body: Value = noop.json().await.expect("body");
    assert_eq!(body["data"]["items"].as_array().expect("items").len(), 1);

    // Vaciar empties it
    let cleared = ctx
        .client
        .delete(format!("{}/cart/vaciar", ctx.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .expect("request failed");
    assert_eq!(cleared.status(), 200);
    let body: Value = cleared.json().await.expect("body");
    assert_eq!(body["data"]["items"].as_array().expect("items").len(), 0);
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn order_listing_is_owner_or_admin_only() {
    let ctx = TestContext::new();
    let owner = ctx
        .register_customer(&TestContext::unique_email("order"))
        .await;
    let stranger = ctx
        .register_customer(&TestContext::unique_email("order"))
        .await;

    let me = ctx
        .client
        .get(format!("{}/users/me", ctx.base_url))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("request failed");
    let me: Value = me.json().await.expect("me body");
    let owner_id = me["data"]["id"].as_i64().expect("user id");

    let as_stranger = ctx
        .client
        .get(format!("{}/ordenes/user/{owner_id}", ctx.base_url))
        .bearer_auth(&stranger)
        .send()
        .await
        .expect("request failed");
    assert_eq!(as_stranger.status(), 403);

    let as_owner = ctx
        .client
        .get(format!("{}/ordenes/user/{owner_id}", ctx.base_url))
        .bearer_auth(&owner)
        .send()
        .await
        .expect("request failed");
    assert_eq!(as_owner.status(), 200);

    let as_admin = ctx
        .client
        .get(format!("{}/ordenes/user/{owner_id}", ctx.base_url))
        .bearer_auth(&ctx.admin_token().await)
        .send()
        .await
        .expect("request failed");
    assert_eq!(as_admin.status(), 200);
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn status_changes_validate_the_status_set() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 5).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("order"))
        .await;
    ctx.add_to_cart(&token, product, 1).await;
    let placed: Value = ctx
        .place_order(&token)
        .await
        .json()
        .await
        .expect("order body");
    let order_id = placed["data"]["id"].as_i64().expect("order id");

    let bogus = ctx
        .client
        .patch(format!("{}/ordenes/{order_id}/status", ctx.base_url))
        .bearer_auth(&admin)
        .json(&json!({"status": "teleported"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(bogus.status(), 400);

    let paid = ctx
        .client
        .patch(format!("{}/ordenes/{order_id}/status", ctx.base_url))
        .bearer_auth(&admin)
        .json(&json!({"status": "paid"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(paid.status(), 200);
    let paid: Value = paid.json().await.expect("body");
    assert_eq!(paid["data"]["status"], json!("paid"));

    let missing = ctx
        .client
        .patch(format!("{}/ordenes/99999999/status", ctx.base_url))
        .bearer_auth(&admin)
        .json(&json!({"status": "paid"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(missing.status(), 404);
}
