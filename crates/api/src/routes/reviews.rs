//! Review route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

use tienda_core::{ProductId, ReviewId};

use crate::db::{OrderRepository, ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::review::{Review, TopRatedProduct};
use crate::response::ApiResponse;
use crate::state::AppState;

const DEFAULT_TOP_LIMIT: i64 = 10;

// =============================================================================
// Request Types
// =============================================================================

/// Review creation payload, before validation.
#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub product_id: Option<i32>,
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Review update payload.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

/// Query parameters for the top-rated ranking.
#[derive(Debug, Deserialize, Default)]
pub struct TopRatedQuery {
    pub limit: Option<i64>,
}

fn validate_rating(rating: i32) -> Result<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::Validation(
            "rating must be between 1 and 5".to_string(),
        ));
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /resenas` - review a purchased product.
///
/// The requester must have at least one order containing the product with a
/// status that counts as a completed purchase (paid, shipped, delivered).
/// One review per user per product.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>)> {
    let product_id = body
        .product_id
        .ok_or_else(|| AppError::Validation("product id is required".to_string()))?;
    let rating = body
        .rating
        .ok_or_else(|| AppError::Validation("rating is required".to_string()))?;
    let comment = body
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("comment is required".to_string()))?;

    validate_rating(rating)?;

    let product_id = ProductId::new(product_id);

    if !ProductRepository::new(state.pool()).exists(product_id).await? {
        return Err(AppError::NotFound("product not found".to_string()));
    }

    let purchased = OrderRepository::new(state.pool())
        .user_purchased_product(user.id, product_id)
        .await?;
    if !purchased {
        return Err(AppError::Forbidden(
            "you can only review products you have purchased".to_string(),
        ));
    }

    let review = ReviewRepository::new(state.pool())
        .create(user.id, product_id, rating, comment)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::data(review))))
}

/// `GET /resenas/product/{productId}` - a product's reviews, newest first
/// (public).
pub async fn list_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<Review>>>> {
    let product_id = ProductId::new(product_id);

    if !ProductRepository::new(state.pool()).exists(product_id).await? {
        return Err(AppError::NotFound("product not found".to_string()));
    }

    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(product_id)
        .await?;

    Ok(Json(ApiResponse::list(reviews)))
}

/// `PATCH /resenas/{id}` - edit one's own review.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<UpdateReviewRequest>,
) -> Result<Json<ApiResponse<Review>>> {
    if body.rating.is_none() && body.comment.is_none() {
        return Err(AppError::Validation(
            "no updatable fields provided".to_string(),
        ));
    }

    if let Some(rating) = body.rating {
        validate_rating(rating)?;
    }

    let reviews = ReviewRepository::new(state.pool());
    let id = ReviewId::new(id);

    let existing = reviews
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("review not found".to_string()))?;

    if existing.user_id != user.id {
        return Err(AppError::Forbidden(
            "you can only edit your own reviews".to_string(),
        ));
    }

    let review = reviews
        .update(id, body.rating, body.comment.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("review not found".to_string()))?;

    Ok(Json(ApiResponse::data(review)))
}

/// `GET /resenas/top` - best-rated products (public).
///
/// Reviews grouped by product, mean rating rounded to two decimals, highest
/// mean first. `?limit=` caps the ranking (default 10).
pub async fn top_rated(
    State(state): State<AppState>,
    Query(query): Query<TopRatedQuery>,
) -> Result<Json<ApiResponse<Vec<TopRatedProduct>>>> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_LIMIT);
    if limit < 1 {
        return Err(AppError::Validation(
            "limit must be a positive integer".to_string(),
        ));
    }

    let ranking = ReviewRepository::new(state.pool()).top_rated(limit).await?;

    Ok(Json(ApiResponse::list(ranking)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
        assert!(validate_rating(-2).is_err());
    }
}
