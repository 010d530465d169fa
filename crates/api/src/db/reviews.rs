//! Review repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tienda_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::review::{Review, TopRatedProduct};

/// Internal row type for review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: i32,
    user_id: i32,
    product_id: i32,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for the top-rated aggregation.
#[derive(Debug, sqlx::FromRow)]
struct TopRatedRow {
    product_id: i32,
    name: String,
    review_count: i64,
    average_rating: Decimal,
}

const REVIEW_COLUMNS: &str = "id, user_id, product_id, rating, comment, created_at, updated_at";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user has already reviewed
    /// the product. Returns `RepositoryError::Database` for other errors.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: i32,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO shop.reviews (user_id, product_id, rating, comment) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(
                    "you have already reviewed this product".to_owned(),
                );
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Get a review by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM shop.reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM shop.reviews \
             WHERE product_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Apply a partial update (rating and/or comment) to a review.
    ///
    /// Returns `None` if the review does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: Option<i32>,
        comment: Option<&str>,
    ) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "UPDATE shop.reviews \
             SET rating = COALESCE($2, rating), \
                 comment = COALESCE($3, comment), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// The best-rated products: reviews grouped by product, mean rating
    /// rounded to two decimals, highest mean first, product name joined in.
    ///
    /// No secondary sort key is applied; products with equal means come back
    /// in whatever order the store yields them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn top_rated(&self, limit: i64) -> Result<Vec<TopRatedProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, TopRatedRow>(
            "SELECT r.product_id, p.name, \
                    COUNT(*) AS review_count, \
                    ROUND(AVG(r.rating), 2) AS average_rating \
             FROM shop.reviews r \
             JOIN shop.products p ON p.id = r.product_id \
             GROUP BY r.product_id, p.name \
             ORDER BY average_rating DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| TopRatedProduct {
                product_id: ProductId::new(r.product_id),
                name: r.name,
                review_count: r.review_count,
                average_rating: r.average_rating,
            })
            .collect())
    }
}
