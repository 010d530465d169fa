//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use tienda_core::{OrderId, OrderStatus, UserId};

use crate::db::{CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::order::{OrderBuildError, OrderStatusStats, OrderWithItems, build_order_lines};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Fallback when the payload names no payment method.
const DEFAULT_PAYMENT_METHOD: &str = "efectivo";

// =============================================================================
// Request Types
// =============================================================================

/// Order creation payload. An empty object is a cash order.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CreateOrderRequest {
    pub payment_method: Option<String>,
}

/// Status change payload.
#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /ordenes` - place an order from the authenticated user's cart.
///
/// Loads the cart with products resolved, verifies stock line by line,
/// computes live-price subtotals, then persists the order with its snapshot
/// lines, decrements stock, and empties the cart in one transaction. A
/// concurrent order racing past the stock check is caught by the guarded
/// decrement inside the transaction, which rolls everything back.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let carts = CartRepository::new(state.pool());

    let cart = carts
        .find_by_user(user.id)
        .await?
        .ok_or_else(|| AppError::Validation(OrderBuildError::EmptyCart.to_string()))?;

    let lines = carts.resolved_lines(cart.id).await?;

    let (items, total) =
        build_order_lines(&lines).map_err(|e| AppError::Validation(e.to_string()))?;

    let payment_method = body
        .payment_method
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_PAYMENT_METHOD);

    let order = OrderRepository::new(state.pool())
        .create(user.id, cart.id, &items, total, payment_method)
        .await?;

    tracing::info!(order_id = %order.order.id, user_id = %user.id, total = %order.order.total, "order placed");

    Ok((StatusCode::CREATED, Json(ApiResponse::data(order))))
}

/// `GET /ordenes/user/{userId}` - a user's orders, newest first.
///
/// Only the owner or an administrator may look.
pub async fn list_for_user(
    State(state): State<AppState>,
    RequireAuth(requester): RequireAuth,
    Path(user_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<OrderWithItems>>>> {
    let target = UserId::new(user_id);

    if !requester.can_act_for(target) {
        return Err(AppError::Forbidden(
            "you do not have permission to view these orders".to_string(),
        ));
    }

    let orders = OrderRepository::new(state.pool())
        .list_for_user(target)
        .await?;

    Ok(Json(ApiResponse::list(orders)))
}

/// `GET /ordenes/stats` - per-status order count and revenue (administrator
/// only), highest revenue first.
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<Vec<OrderStatusStats>>>> {
    let stats = OrderRepository::new(state.pool()).stats_by_status().await?;

    Ok(Json(ApiResponse::list(stats)))
}

/// `PATCH /ordenes/{id}/status` - move an order through its lifecycle
/// (administrator only).
pub async fn change_status(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<ChangeStatusRequest>,
) -> Result<Json<ApiResponse<crate::models::order::Order>>> {
    let status: OrderStatus = body
        .status
        .parse()
        .map_err(|e: String| AppError::Validation(e))?;

    let order = OrderRepository::new(state.pool())
        .set_status(OrderId::new(id), status)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

    Ok(Json(ApiResponse::data(order)))
}
