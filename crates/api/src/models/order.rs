//! Order domain types and the snapshot-line builder.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use tienda_core::{OrderId, OrderStatus, ProductId, UserId};

use super::cart::ResolvedCartLine;

/// A placed order.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub total: Decimal,
    pub payment_method: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// A snapshot line item captured at order creation.
///
/// Product name and unit price are copies, not references; later catalog
/// changes never retroactively alter a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
}

/// An order together with its snapshot lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Per-status aggregate returned by the order stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStatusStats {
    pub status: OrderStatus,
    pub count: i64,
    pub total_revenue: Decimal,
}

/// Errors turning a cart into order lines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderBuildError {
    /// The cart has no lines to order.
    #[error("the cart is empty; add products before placing an order")]
    EmptyCart,

    /// A line asks for more units than the product has in stock.
    #[error("insufficient stock for {product}")]
    InsufficientStock {
        /// Name of the product that cannot be fulfilled.
        product: String,
    },
}

/// Build snapshot order lines and the order total from resolved cart lines.
///
/// Verifies stock line by line, failing on the first line whose product
/// cannot cover the requested quantity. Subtotals use the live price carried
/// by each resolved line; the total is the sum of subtotals. No partial
/// result is ever produced.
///
/// # Errors
///
/// Returns [`OrderBuildError::EmptyCart`] when `lines` is empty and
/// [`OrderBuildError::InsufficientStock`] naming the first product with too
/// little stock.
pub fn build_order_lines(
    lines: &[ResolvedCartLine],
) -> Result<(Vec<OrderItem>, Decimal), OrderBuildError> {
    if lines.is_empty() {
        return Err(OrderBuildError::EmptyCart);
    }

    let mut items = Vec::with_capacity(lines.len());
    let mut total = Decimal::ZERO;

    for line in lines {
        if line.stock < line.quantity {
            return Err(OrderBuildError::InsufficientStock {
                product: line.name.clone(),
            });
        }

        let subtotal = line.price * Decimal::from(line.quantity);
        total += subtotal;

        items.push(OrderItem {
            product_id: line.product_id,
            product_name: line.name.clone(),
            unit_price: line.price,
            quantity: line.quantity,
            subtotal,
        });
    }

    Ok((items, total))
}
