//! Review domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use tienda_core::{ProductId, ReviewId, UserId};

/// A product review.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// 1 to 5, inclusive.
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A row of the top-rated products ranking.
#[derive(Debug, Clone, Serialize)]
pub struct TopRatedProduct {
    pub product_id: ProductId,
    pub name: String,
    pub review_count: i64,
    /// Mean rating rounded to two decimal places.
    pub average_rating: Decimal,
}
