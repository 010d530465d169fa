//! Order repository for database operations.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tienda_core::{CartId, OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{Order, OrderItem, OrderStatusStats, OrderWithItems};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    total: Decimal,
    payment_method: String,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            total: row.total,
            payment_method: row.payment_method,
            status: row.status,
            created_at: row.created_at,
        }
    }
}

/// Internal row type for order line queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: i32,
    product_id: i32,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
    subtotal: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
            subtotal: row.subtotal,
        }
    }
}

/// Internal row type for the per-status aggregation.
#[derive(Debug, sqlx::FromRow)]
struct StatusStatsRow {
    status: OrderStatus,
    count: i64,
    total_revenue: Decimal,
}

const ORDER_COLUMNS: &str = "id, user_id, total, payment_method, status, created_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist an order with its snapshot lines, decrement product stock,
    /// and empty the originating cart — all in one transaction.
    ///
    /// Stock decrements are guarded (`stock >= quantity`); when a concurrent
    /// order has consumed the stock between the caller's check and this
    /// write, the guard touches zero rows and the whole transaction rolls
    /// back, so stock can never go negative and no half-placed order is left
    /// behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` naming the product when a guarded
    /// stock decrement fails. Returns `RepositoryError::Database` for other
    /// database errors.
    pub async fn create(
        &self,
        user_id: UserId,
        cart_id: CartId,
        items: &[OrderItem],
        total: Decimal,
        payment_method: &str,
    ) -> Result<OrderWithItems, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO shop.orders (user_id, total, payment_method) \
             VALUES ($1, $2, $3) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(total)
        .bind(payment_method)
        .fetch_one(&mut *tx)
        .await?;

        for item in items {
            let result = sqlx::query(
                "UPDATE shop.products \
                 SET stock = stock - $2, updated_at = now() \
                 WHERE id = $1 AND stock >= $2",
            )
            .bind(item.product_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the open transaction rolls everything back.
                return Err(RepositoryError::Conflict(format!(
                    "insufficient stock for {}",
                    item.product_name
                )));
            }

            sqlx::query(
                "INSERT INTO shop.order_items \
                     (order_id, product_id, product_name, unit_price, quantity, subtotal) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(row.id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.subtotal)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM shop.cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(OrderWithItems {
            order: row.into(),
            items: items.to_vec(),
        })
    }

    /// List a user's orders with their snapshot lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithItems>, RepositoryError> {
        let order_rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders \
             WHERE user_id = $1 \
             ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        if order_rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = order_rows.iter().map(|o| o.id).collect();

        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, product_name, unit_price, quantity, subtotal \
             FROM shop.order_items \
             WHERE order_id = ANY($1) \
             ORDER BY id ASC",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        let mut items_by_order: HashMap<i32, Vec<OrderItem>> = HashMap::new();
        for item in item_rows {
            items_by_order
                .entry(item.order_id)
                .or_default()
                .push(item.into());
        }

        Ok(order_rows
            .into_iter()
            .map(|row| {
                let items = items_by_order.remove(&row.id).unwrap_or_default();
                OrderWithItems {
                    order: row.into(),
                    items,
                }
            })
            .collect())
    }

    /// Set an order's status.
    ///
    /// Returns `None` if the order does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE shop.orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Per-status order count and revenue, highest revenue first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats_by_status(&self) -> Result<Vec<OrderStatusStats>, RepositoryError> {
        let rows = sqlx::query_as::<_, StatusStatsRow>(
            "SELECT status, COUNT(*) AS count, COALESCE(SUM(total), 0) AS total_revenue \
             FROM shop.orders \
             GROUP BY status \
             ORDER BY total_revenue DESC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| OrderStatusStats {
                status: r.status,
                count: r.count,
                total_revenue: r.total_revenue,
            })
            .collect())
    }

    /// Whether the user has an order containing the product in a status that
    /// counts as a completed purchase (paid, shipped, or delivered).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn user_purchased_product(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let purchased = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS ( \
                 SELECT 1 \
                 FROM shop.orders o \
                 JOIN shop.order_items oi ON oi.order_id = o.id \
                 WHERE o.user_id = $1 \
                   AND oi.product_id = $2 \
                   AND o.status IN ('paid', 'shipped', 'delivered') \
             )",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(purchased)
    }
}
