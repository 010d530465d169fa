//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tienda_core::{CartId, ProductId, UserId};

/// A user's cart (one per user).
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart line with its product resolved.
///
/// Carries the live product name, price, and stock at read time; this is
/// also the input to order building, where price and stock are taken from
/// this instant rather than from any earlier snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCartLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub quantity: i32,
}

/// A cart line as serialized in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub quantity: i32,
}

impl From<ResolvedCartLine> for CartLineView {
    fn from(line: ResolvedCartLine) -> Self {
        Self {
            product_id: line.product_id,
            name: line.name,
            price: line.price,
            stock: line.stock,
            quantity: line.quantity,
        }
    }
}

/// A cart with its lines resolved, as returned by the cart endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartLineView>,
}

impl CartView {
    /// Assemble the API view from a cart and its resolved lines.
    #[must_use]
    pub fn assemble(cart: &Cart, lines: Vec<ResolvedCartLine>) -> Self {
        Self {
            id: cart.id,
            user_id: cart.user_id,
            items: lines.into_iter().map(CartLineView::from).collect(),
        }
    }
}
