//! Product repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use tienda_core::{CategoryId, ProductId};

use super::RepositoryError;
use crate::models::catalog::{CategorySummary, Product, ProductStockView, ProductWithCategory};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    category_id: i32,
    rating_average: Decimal,
    rating_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category_id: CategoryId::new(row.category_id),
            rating_average: row.rating_average,
            rating_count: row.rating_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for the joined product + category listing.
///
/// Category columns are nullable: the LEFT JOIN yields no match for products
/// whose category has been deleted.
#[derive(Debug, sqlx::FromRow)]
struct ProductWithCategoryRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    stock: i32,
    category_id: i32,
    rating_average: Decimal,
    rating_count: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: Option<String>,
    category_description: Option<String>,
}

impl From<ProductWithCategoryRow> for ProductWithCategory {
    fn from(row: ProductWithCategoryRow) -> Self {
        let category = row.category_name.map(|name| CategorySummary {
            id: CategoryId::new(row.category_id),
            name,
            description: row.category_description,
        });

        Self {
            product: Product {
                id: ProductId::new(row.id),
                name: row.name,
                description: row.description,
                price: row.price,
                stock: row.stock,
                category_id: CategoryId::new(row.category_id),
                rating_average: row.rating_average,
                rating_count: row.rating_count,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            category,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, category_id, \
     rating_average, rating_count, created_at, updated_at";

/// Fields for a new product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub category_id: CategoryId,
}

/// Partial update applied to a product.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<CategoryId>,
}

impl ProductChanges {
    /// Whether this update carries any field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.category_id.is_none()
    }
}

/// Inclusive price bounds for product listings.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriceFilter {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO shop.products (name, description, price, stock, category_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(new.stock)
        .bind(new.category_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// List products with their category details resolved, optionally
    /// filtered by an inclusive price range (bounds combine conjunctively).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_category(
        &self,
        filter: PriceFilter,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductWithCategoryRow>(
            "SELECT p.id, p.name, p.description, p.price, p.stock, p.category_id, \
                    p.rating_average, p.rating_count, p.created_at, p.updated_at, \
                    c.name AS category_name, c.description AS category_description \
             FROM shop.products p \
             LEFT JOIN shop.categories c ON c.id = p.category_id \
             WHERE ($1::numeric IS NULL OR p.price >= $1) \
               AND ($2::numeric IS NULL OR p.price <= $2) \
             ORDER BY p.created_at DESC",
        )
        .bind(filter.min)
        .bind(filter.max)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM shop.products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Whether a product with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM shop.products WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    /// Apply a partial update to a product.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE shop.products \
             SET name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 price = COALESCE($4, price), \
                 stock = COALESCE($5, stock), \
                 category_id = COALESCE($6, category_id), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.stock)
        .bind(changes.category_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Set a product's stock to an absolute value.
    ///
    /// Returns `None` if the product does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_stock(
        &self,
        id: ProductId,
        stock: i32,
    ) -> Result<Option<ProductStockView>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE shop.products \
             SET stock = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(stock)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| ProductStockView {
            id: ProductId::new(r.id),
            name: r.name,
            stock: r.stock,
        }))
    }

    /// Delete a product.
    ///
    /// Returns `true` if a row was deleted, `false` if it didn't exist.
    /// Reviews and cart lines referencing the product are left behind; cart
    /// reads drop lines whose product has vanished.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
