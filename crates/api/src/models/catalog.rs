//! Category and product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tienda_core::{CategoryId, ProductId};

/// A product category.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog product.
///
/// `category_id` is a soft reference: the category may have been deleted out
/// from under the product, in which case joined listings carry no category
/// details. `rating_average` and `rating_count` are denormalized summary
/// fields that no write path currently recomputes.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: CategoryId,
    pub rating_average: Decimal,
    pub rating_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category details joined into a product listing.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

/// A product with its category details resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    /// `None` when the referenced category no longer exists.
    pub category: Option<CategorySummary>,
}

/// Reduced view returned by the stock adjustment endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ProductStockView {
    pub id: ProductId,
    pub name: String,
    pub stock: i32,
}
