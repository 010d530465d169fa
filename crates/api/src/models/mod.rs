//! Domain models for the shop.
//!
//! These types represent validated domain objects separate from database row
//! types; the `db` repositories convert rows into them, and the route layer
//! serializes them into the JSON envelope.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod review;
pub mod user;

pub use cart::{Cart, CartLineView, CartView, ResolvedCartLine};
pub use catalog::{Category, CategorySummary, Product, ProductStockView, ProductWithCategory};
pub use order::{
    Order, OrderBuildError, OrderItem, OrderStatusStats, OrderWithItems, build_order_lines,
};
pub use review::{Review, TopRatedProduct};
pub use user::{PublicUser, User};
