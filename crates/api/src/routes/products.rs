//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use tienda_core::{CategoryId, ProductId};

use crate::db::ProductRepository;
use crate::db::products::{NewProduct, PriceFilter, ProductChanges};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::catalog::{Product, ProductStockView, ProductWithCategory};
use crate::response::ApiResponse;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Payload for creating a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    pub category_id: i32,
}

/// Payload for updating a product.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub category_id: Option<i32>,
}

/// Payload for the absolute stock adjustment.
#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub stock: i32,
}

/// Inclusive price bounds on the listing, combined conjunctively.
#[derive(Debug, Deserialize, Default)]
pub struct ListProductsQuery {
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /products` - list products with category details joined (public).
///
/// `?min_price=` / `?max_price=` filter by an inclusive price range.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ApiResponse<Vec<ProductWithCategory>>>> {
    let products = ProductRepository::new(state.pool())
        .list_with_category(PriceFilter {
            min: query.min_price,
            max: query.max_price,
        })
        .await?;

    Ok(Json(ApiResponse::list(products)))
}

/// `POST /products` - create a product (administrator only).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(body): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("product name is required".to_string()));
    }
    if body.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }
    if body.price.is_sign_negative() {
        return Err(AppError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    if body.stock < 0 {
        return Err(AppError::Validation(
            "stock must be a non-negative number".to_string(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            name: name.to_string(),
            description: body.description,
            price: body.price,
            stock: body.stock,
            category_id: CategoryId::new(body.category_id),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(product))))
}

/// `PATCH /products/{id}` - update a product (administrator only).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<UpdateProductRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    if body.price.is_some_and(|p| p.is_sign_negative()) {
        return Err(AppError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    if body.stock.is_some_and(|s| s < 0) {
        return Err(AppError::Validation(
            "stock must be a non-negative number".to_string(),
        ));
    }

    let changes = ProductChanges {
        name: body.name,
        description: body.description,
        price: body.price,
        stock: body.stock,
        category_id: body.category_id.map(CategoryId::new),
    };

    if changes.is_empty() {
        return Err(AppError::Validation(
            "no updatable fields provided".to_string(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .update(ProductId::new(id), &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    Ok(Json(ApiResponse::data(product)))
}

/// `PATCH /products/{id}/stock` - set absolute stock.
///
/// Reachable by any authenticated role, not just administrators.
pub async fn set_stock(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<SetStockRequest>,
) -> Result<Json<ApiResponse<ProductStockView>>> {
    if body.stock < 0 {
        return Err(AppError::Validation(
            "stock must be a non-negative number".to_string(),
        ));
    }

    let view = ProductRepository::new(state.pool())
        .set_stock(ProductId::new(id), body.stock)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;

    tracing::info!(product_id = %view.id, stock = view.stock, adjusted_by = %user.id, "stock adjusted");

    Ok(Json(ApiResponse::data(view)))
}

/// `DELETE /products/{id}` - delete a product (administrator only).
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let deleted = ProductRepository::new(state.pool())
        .delete(ProductId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound("product not found".to_string()));
    }

    Ok(Json(ApiResponse::empty()))
}
