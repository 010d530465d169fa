//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use tienda_core::CategoryId;

use crate::db::CategoryRepository;
use crate::db::categories::CategoryChanges;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAdmin;
use crate::models::catalog::Category;
use crate::response::ApiResponse;
use crate::state::AppState;

/// Payload for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Payload for updating a category.
#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// `GET /categories` - list all categories (public).
pub async fn list(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Category>>>> {
    let categories = CategoryRepository::new(state.pool()).list_all().await?;

    Ok(Json(ApiResponse::list(categories)))
}

/// `POST /categories` - create a category (administrator only).
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiJson(body): ApiJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("category name is required".to_string()));
    }

    let category = CategoryRepository::new(state.pool())
        .create(name, body.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(category))))
}

/// `PATCH /categories/{id}` - update a category (administrator only).
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>> {
    let changes = CategoryChanges {
        name: body.name,
        description: body.description,
    };

    if changes.is_empty() {
        return Err(AppError::Validation(
            "no updatable fields provided".to_string(),
        ));
    }

    let category = CategoryRepository::new(state.pool())
        .update(CategoryId::new(id), &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;

    Ok(Json(ApiResponse::data(category)))
}

/// `DELETE /categories/{id}` - delete a category (administrator only).
///
/// The delete is hard and unconditional; no check is made for products that
/// still reference the category.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let deleted = CategoryRepository::new(state.pool())
        .delete(CategoryId::new(id))
        .await?;

    if !deleted {
        return Err(AppError::NotFound("category not found".to_string()));
    }

    Ok(Json(ApiResponse::empty()))
}
