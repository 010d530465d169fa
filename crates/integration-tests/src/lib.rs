//! Integration tests for Tienda.
//!
//! # Running Tests
//!
//! ```bash
//! # Start PostgreSQL and migrate
//! cargo run -p tienda-cli -- migrate
//!
//! # Create the administrator the tests drive the catalog with
//! cargo run -p tienda-cli -- admin create \
//!     -e admin@tienda.test -n "Test Admin" -p <password>
//!
//! # Start the server, then run the ignored tests
//! cargo run -p tienda-api &
//! cargo test -p tienda-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `TIENDA_BASE_URL` - Server under test (default: `http://localhost:3000`)
//! - `TIENDA_ADMIN_EMAIL` / `TIENDA_ADMIN_PASSWORD` - Credentials of a
//!   pre-created administrator (default: `admin@tienda.test` / none)

#![allow(clippy::missing_panics_doc)]

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Shared context for driving the API under test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Create a context pointed at the server under test.
    #[must_use]
    pub fn new() -> Self {
        let base_url =
            std::env::var("TIENDA_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// A unique email so tests never collide on the unique constraint.
    #[must_use]
    pub fn unique_email(prefix: &str) -> String {
        format!("{prefix}-{}@tienda.test", Uuid::new_v4().simple())
    }

    /// Register a fresh customer, returning their token.
    pub async fn register_customer(&self, email: &str) -> String {
        let resp = self
            .client
            .post(format!("{}/users", self.base_url))
            .json(&json!({
                "name": "Test Customer",
                "email": email,
                "password": "hunter2hunter2",
            }))
            .send()
            .await
            .expect("register request failed");

        assert_eq!(resp.status(), 201, "registration should succeed");
        let body: Value = resp.json().await.expect("register body");
        body["data"]["token"]
            .as_str()
            .expect("token in register response")
            .to_string()
    }

    /// Log in and return the raw response.
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/users/login", self.base_url))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await
            .expect("login request failed")
    }

    /// Token of the pre-created administrator (see crate docs).
    pub async fn admin_token(&self) -> String {
        let email = std::env::var("TIENDA_ADMIN_EMAIL")
            .unwrap_or_else(|_| "admin@tienda.test".to_string());
        let password =
            std::env::var("TIENDA_ADMIN_PASSWORD").expect("TIENDA_ADMIN_PASSWORD must be set");

        let resp = self.login(&email, &password).await;
        assert_eq!(resp.status(), 200, "admin login should succeed");
        let body: Value = resp.json().await.expect("admin login body");
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    /// Create a category as the administrator, returning its id.
    pub async fn create_category(&self, admin_token: &str) -> i64 {
        let resp = self
            .client
            .post(format!("{}/categories", self.base_url))
            .bearer_auth(admin_token)
            .json(&json!({"name": format!("cat-{}", Uuid::new_v4().simple())}))
            .send()
            .await
            .expect("create category failed");

        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.expect("category body");
        body["data"]["id"].as_i64().expect("category id")
    }

    /// Create a product as the administrator, returning its id.
    pub async fn create_product(
        &self,
        admin_token: &str,
        category_id: i64,
        price: &str,
        stock: i64,
    ) -> i64 {
        let resp = self
            .client
            .post(format!("{}/products", self.base_url))
            .bearer_auth(admin_token)
            .json(&json!({
                "name": format!("product-{}", Uuid::new_v4().simple()),
                "description": "integration test product",
                "price": price,
                "stock": stock,
                "category_id": category_id,
            }))
            .send()
            .await
            .expect("create product failed");

        assert_eq!(resp.status(), 201, "product creation should succeed");
        let body: Value = resp.json().await.expect("product body");
        body["data"]["id"].as_i64().expect("product id")
    }

    /// Add a product to the bearer's cart.
    pub async fn add_to_cart(&self, token: &str, product_id: i64, quantity: i64) -> reqwest::Response {
        self.client
            .post(format!("{}/cart", self.base_url))
            .bearer_auth(token)
            .json(&json!({"product_id": product_id, "quantity": quantity}))
            .send()
            .await
            .expect("add to cart failed")
    }

    /// Place an order from the bearer's cart.
    pub async fn place_order(&self, token: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/ordenes", self.base_url))
            .bearer_auth(token)
            .json(&json!({}))
            .send()
            .await
            .expect("place order failed")
    }

    /// Fetch the current stock of a product from the public listing.
    pub async fn product_stock(&self, product_id: i64) -> i64 {
        let resp = self
            .client
            .get(format!("{}/products", self.base_url))
            .send()
            .await
            .expect("list products failed");
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.expect("products body");
        let products = body["data"].as_array().expect("products array");
        let product = products
            .iter()
            .find(|p| p["id"].as_i64() == Some(product_id))
            .expect("product present in listing");
        product["stock"].as_i64().expect("stock field")
    }
}

/// Read a decimal field that may serialize as a JSON number or string.
#[must_use]
pub fn decimal_as_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().expect("numeric decimal"),
        Value::String(s) => s.parse().expect("string decimal"),
        other => panic!("expected decimal, got {other:?}"),
    }
}
