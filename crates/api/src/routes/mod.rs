//! HTTP route handlers for the shop API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (pings the pool)
//!
//! # Users & auth
//! POST   /users                      - Register (public)
//! POST   /users/login                - Login (public)
//! GET    /users/me                   - Own profile (token)
//! PATCH  /users/{id}                 - Update profile (token, self-or-admin)
//! DELETE /users/{id}                 - Delete account (token, self-or-admin)
//! GET    /users                      - List accounts (token + admin)
//!
//! # Catalog
//! GET    /products                   - Listing with category joined (public)
//! POST   /products                   - Create (token + admin)
//! PATCH  /products/{id}              - Update (token + admin)
//! DELETE /products/{id}              - Delete (token + admin)
//! PATCH  /products/{id}/stock        - Absolute stock set (token, any role)
//! GET    /categories                 - Listing (public)
//! POST   /categories                 - Create (token + admin)
//! PATCH  /categories/{id}            - Update (token + admin)
//! DELETE /categories/{id}            - Delete (token + admin)
//!
//! # Cart (all token)
//! GET    /cart                       - Own cart, created lazily
//! POST   /cart                       - Add one item or a batch
//! DELETE /cart/vaciar                - Empty the cart
//! DELETE /cart/{productId}           - Drop a product's line
//!
//! # Orders
//! POST  /ordenes                     - Place order from cart (token)
//! GET   /ordenes/user/{userId}       - A user's orders (token, self-or-admin)
//! GET   /ordenes/stats               - Per-status stats (token + admin)
//! PATCH /ordenes/{id}/status         - Change status (token + admin)
//!
//! # Reviews
//! POST  /resenas                     - Review a purchased product (token)
//! PATCH /resenas/{id}                - Edit own review (token)
//! GET   /resenas/top                 - Best-rated products (public)
//! GET   /resenas/product/{productId} - A product's reviews (public)
//! ```

pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::register).get(users::list))
        .route("/login", post(users::login))
        .route("/me", get(users::me))
        .route("/{id}", patch(users::update).delete(users::delete))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/{id}", patch(products::update).delete(products::delete))
        .route("/{id}/stock", patch(products::set_stock))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::list).post(categories::create))
        .route(
            "/{id}",
            patch(categories::update).delete(categories::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::get).post(cart::add_items))
        .route("/vaciar", delete(cart::clear))
        .route("/{product_id}", delete(cart::remove_item))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/user/{user_id}", get(orders::list_for_user))
        .route("/stats", get(orders::stats))
        .route("/{id}/status", patch(orders::change_status))
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create))
        .route("/top", get(reviews::top_rated))
        .route("/product/{product_id}", get(reviews::list_for_product))
        .route("/{id}", patch(reviews::update))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/cart", cart_routes())
        .nest("/ordenes", order_routes())
        .nest("/resenas", review_routes())
}
