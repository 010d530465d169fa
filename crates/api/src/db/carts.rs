//! Cart repository for database operations.
//!
//! Cart lines are an owned-embedded list: they are only ever addressed
//! through their cart and cascade away with it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tienda_core::{CartId, ProductId, UserId};

use super::RepositoryError;
use crate::models::cart::{Cart, ResolvedCartLine};

/// Internal row type for cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for cart lines joined with their product.
#[derive(Debug, sqlx::FromRow)]
struct ResolvedCartLineRow {
    product_id: i32,
    name: String,
    price: Decimal,
    stock: i32,
    quantity: i32,
}

impl From<ResolvedCartLineRow> for ResolvedCartLine {
    fn from(row: ResolvedCartLineRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price: row.price,
            stock: row.stock,
            quantity: row.quantity,
        }
    }
}

const CART_COLUMNS: &str = "id, user_id, created_at, updated_at";

/// A validated item to merge into a cart.
#[derive(Debug, Clone, Copy)]
pub struct CartItemInsert {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's cart, lazily creating an empty one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        // The no-op DO UPDATE makes RETURNING yield the row on conflict too.
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "INSERT INTO shop.carts (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING {CART_COLUMNS}"
        ))
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Find the user's cart without creating one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "SELECT {CART_COLUMNS} FROM shop.carts WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Load the cart's lines with their products resolved, in insertion
    /// order. Lines whose product no longer exists are dropped by the join.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn resolved_lines(
        &self,
        cart_id: CartId,
    ) -> Result<Vec<ResolvedCartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, ResolvedCartLineRow>(
            "SELECT ci.product_id, p.name, p.price, p.stock, ci.quantity \
             FROM shop.cart_items ci \
             JOIN shop.products p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.id ASC",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Merge a batch of validated items into the cart.
    ///
    /// Runs in one transaction so a batch is applied entirely or not at all.
    /// Items whose product is already in the cart accumulate quantity; new
    /// products append a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails (the whole
    /// batch rolls back).
    pub async fn add_items(
        &self,
        cart_id: CartId,
        items: &[CartItemInsert],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        for item in items {
            sqlx::query(
                "INSERT INTO shop.cart_items (cart_id, product_id, quantity) \
                 VALUES ($1, $2, $3) \
                 ON CONFLICT (cart_id, product_id) \
                 DO UPDATE SET quantity = shop.cart_items.quantity + EXCLUDED.quantity",
            )
            .bind(cart_id)
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE shop.carts SET updated_at = now() WHERE id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Remove any line for the given product. A no-op when the product is
    /// not in the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart_id)
            .bind(product_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shop.cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
