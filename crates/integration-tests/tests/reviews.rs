//! Integration tests for purchase-gated reviews and the top-rated ranking.
//!
//! These tests require:
//! - A running `PostgreSQL` database, migrated (tienda-cli migrate)
//! - The API server running (cargo run -p tienda-api)
//! - A pre-created administrator (see the tienda-integration-tests docs)
//!
//! Run with: cargo test -p tienda-integration-tests -- --ignored

use serde_json::{Value, json};

use tienda_integration_tests::{TestContext, decimal_as_f64};

/// Buy a product and have the administrator mark the order paid, so the
/// buyer passes the review purchase gate.
async fn purchase_paid(ctx: &TestContext, admin: &str, token: &str, product: i64) {
    assert_eq!(ctx.add_to_cart(token, product, 1).await.status(), 200);

    let placed = ctx.place_order(token).await;
    assert_eq!(placed.status(), 201);
    let placed: Value = placed.json().await.expect("order body");
    let order_id = placed["data"]["id"].as_i64().expect("order id");

    let paid = ctx
        .client
        .patch(format!("{}/ordenes/{order_id}/status", ctx.base_url))
        .bearer_auth(admin)
        .json(&json!({"status": "paid"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(paid.status(), 200);
}

async fn post_review(ctx: &TestContext, token: &str, product: i64, rating: i64) -> reqwest::Response {
    ctx.client
        .post(format!("{}/resenas", ctx.base_url))
        .bearer_auth(token)
        .json(&json!({
            "product_id": product,
            "rating": rating,
            "comment": "integration test review",
        }))
        .send()
        .await
        .expect("review request failed")
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn review_requires_completed_purchase() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 10).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("review"))
        .await;

    // No purchase at all
    assert_eq!(post_review(&ctx, &token, product, 4).await.status(), 403);

    // A pending order does not count as a purchase
    ctx.add_to_cart(&token, product, 1).await;
    assert_eq!(ctx.place_order(&token).await.status(), 201);
    assert_eq!(post_review(&ctx, &token, product, 4).await.status(), 403);
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn paid_purchase_unlocks_review_and_duplicates_conflict() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 10).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("review"))
        .await;
    purchase_paid(&ctx, &admin, &token, product).await;

    let first = post_review(&ctx, &token, product, 5).await;
    assert_eq!(first.status(), 201);

    // One review per (user, product)
    let second = post_review(&ctx, &token, product, 3).await;
    assert_eq!(second.status(), 400);
    let body: Value = second.json().await.expect("body");
    assert!(
        body["error"]["message"]
            .as_str()
            .expect("message")
            .contains("already reviewed")
    );
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn review_validation_and_missing_product() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 10).await;

    let token = ctx
        .register_customer(&TestContext::unique_email("review"))
        .await;
    purchase_paid(&ctx, &admin, &token, product).await;

    // Rating out of range
    assert_eq!(post_review(&ctx, &token, product, 6).await.status(), 400);
    assert_eq!(post_review(&ctx, &token, product, 0).await.status(), 400);

    // Absent product
    assert_eq!(post_review(&ctx, &token, 99999999, 4).await.status(), 404);

    // Listing reviews of an absent product
    let missing = ctx
        .client
        .get(format!("{}/resenas/product/99999999", ctx.base_url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn review_update_is_owner_only() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;
    let product = ctx.create_product(&admin, category, "10.00", 10).await;

    let owner = ctx
        .register_customer(&TestContext::unique_email("review"))
        .await;
    purchase_paid(&ctx, &admin, &owner, product).await;

    let review = post_review(&ctx, &owner, product, 3).await;
    let review: Value = review.json().await.expect("body");
    let review_id = review["data"]["id"].as_i64().expect("review id");

    // A stranger cannot edit it
    let stranger = ctx
        .register_customer(&TestContext::unique_email("review"))
        .await;
    let denied = ctx
        .client
        .patch(format!("{}/resenas/{review_id}", ctx.base_url))
        .bearer_auth(&stranger)
        .json(&json!({"rating": 1}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(denied.status(), 403);

    // An empty update is a validation error
    let empty = ctx
        .client
        .patch(format!("{}/resenas/{review_id}", ctx.base_url))
        .bearer_auth(&owner)
        .json(&json!({}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(empty.status(), 400);

    // The owner can
    let updated = ctx
        .client
        .patch(format!("{}/resenas/{review_id}", ctx.base_url))
        .bearer_auth(&owner)
        .json(&json!({"rating": 5, "comment": "changed my mind"}))
        .send()
        .await
        .expect("request failed");
    assert_eq!(updated.status(), 200);
    let updated: Value = updated.json().await.expect("body");
    assert_eq!(updated["data"]["rating"], json!(5));
}

#[tokio::test]
#[ignore = "requires a running tienda-api server and migrated PostgreSQL"]
async fn top_rated_ranks_distinct_means_correctly() {
    let ctx = TestContext::new();
    let admin = ctx.admin_token().await;
    let category = ctx.create_category(&admin).await;

    // P1 gets 5 and 4 (mean 4.50), P2 gets a single 4 (mean 4.00)
    let p1 = ctx.create_product(&admin, category, "10.00", 50).await;
    let p2 = ctx.create_product(&admin, category, "10.00", 50).await;

    let rater_a = ctx
        .register_customer(&TestContext::unique_email("top"))
        .await;
    let rater_b = ctx
        .register_customer(&TestContext::unique_email("top"))
        .await;

    purchase_paid(&ctx, &admin, &rater_a, p1).await;
    purchase_paid(&ctx, &admin, &rater_b, p1).await;
    purchase_paid(&ctx, &admin, &rater_b, p2).await;

    assert_eq!(post_review(&ctx, &rater_a, p1, 5).await.status(), 201);
    assert_eq!(post_review(&ctx, &rater_b, p1, 4).await.status(), 201);
    assert_eq!(post_review(&ctx, &rater_b, p2, 4).await.status(), 201);

    let resp = ctx
        .client
        .get(format!("{}/resenas/top", ctx.base_url))
        .query(&[("limit", "100")])
        .send()
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("body");
    let ranking = body["data"].as_array().expect("ranking");

    let pos_p1 = ranking
        .iter()
        .position(|r| r["product_id"].as_i64() == Some(p1))
        .expect("p1 ranked");
    let pos_p2 = ranking
        .iter()
        .position(|r| r["product_id"].as_i64() == Some(p2))
        .expect("p2 ranked");

    assert!(pos_p1 < pos_p2, "the 4.50 mean must rank above the 4.00 mean");

    let p1_entry = &ranking[pos_p1];
    assert!((decimal_as_f64(&p1_entry["average_rating"]) - 4.5).abs() < f64::EPSILON);
    assert_eq!(p1_entry["review_count"], json!(2));

    let p2_entry = &ranking[pos_p2];
    assert!((decimal_as_f64(&p2_entry["average_rating"]) - 4.0).abs() < f64::EPSILON);
    assert_eq!(p2_entry["review_count"], json!(1));
}
