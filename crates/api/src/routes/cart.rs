//! Cart route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use tienda_core::ProductId;

use crate::db::carts::CartItemInsert;
use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::cart::CartView;
use crate::response::ApiResponse;
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// One item of an add-to-cart request, before validation.
#[derive(Debug, Deserialize)]
pub struct CartItemPayload {
    pub product_id: Option<i32>,
    pub quantity: Option<i64>,
}

/// Add-to-cart payload: a single item or a list of items.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AddItemsRequest {
    One(CartItemPayload),
    Many(Vec<CartItemPayload>),
}

impl AddItemsRequest {
    fn into_vec(self) -> Vec<CartItemPayload> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }
}

/// Shape-check a batch of items, naming the offending index on failure.
///
/// The whole batch is rejected on the first bad item; existence of the
/// referenced products is checked separately (it needs the store).
fn validate_items(items: &[CartItemPayload]) -> Result<Vec<CartItemInsert>> {
    if items.is_empty() {
        return Err(AppError::Validation("no items provided".to_string()));
    }

    let mut validated = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let product_id = item.product_id.ok_or_else(|| {
            AppError::Validation(format!("item at index {index}: product id is required"))
        })?;

        let quantity = item
            .quantity
            .and_then(|q| i32::try_from(q).ok())
            .filter(|q| *q >= 1)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "item at index {index}: quantity must be a positive integer"
                ))
            })?;

        validated.push(CartItemInsert {
            product_id: ProductId::new(product_id),
            quantity,
        });
    }

    Ok(validated)
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /cart` - the authenticated user's cart, created lazily.
pub async fn get(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiResponse<CartView>>> {
    let carts = CartRepository::new(state.pool());

    let cart = carts.get_or_create(user.id).await?;
    let lines = carts.resolved_lines(cart.id).await?;

    Ok(Json(ApiResponse::data(CartView::assemble(&cart, lines))))
}

/// `POST /cart` - merge one item or a batch of items into the cart.
///
/// The batch is all-or-nothing: any invalid item rejects the request with a
/// message naming its index, and nothing is applied.
pub async fn add_items(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddItemsRequest>,
) -> Result<Json<ApiResponse<CartView>>> {
    let items = validate_items(&body.into_vec())?;

    let products = ProductRepository::new(state.pool());
    for (index, item) in items.iter().enumerate() {
        if !products.exists(item.product_id).await? {
            return Err(AppError::Validation(format!(
                "item at index {index}: product {} does not exist",
                item.product_id
            )));
        }
    }

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    carts.add_items(cart.id, &items).await?;

    let lines = carts.resolved_lines(cart.id).await?;

    Ok(Json(ApiResponse::data(CartView::assemble(&cart, lines))))
}

/// `DELETE /cart/{productId}` - drop a product's line from the cart.
///
/// Removing a product that is not in the cart is a no-op; only a missing
/// cart is an error.
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<i32>,
) -> Result<Json<ApiResponse<CartView>>> {
    let carts = CartRepository::new(state.pool());

    let cart = carts
        .find_by_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

    carts
        .remove_item(cart.id, ProductId::new(product_id))
        .await?;

    let lines = carts.resolved_lines(cart.id).await?;

    Ok(Json(ApiResponse::data(CartView::assemble(&cart, lines))))
}

/// `DELETE /cart/vaciar` - empty the cart.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiResponse<CartView>>> {
    let carts = CartRepository::new(state.pool());

    let cart = carts
        .find_by_user(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart not found".to_string()))?;

    carts.clear(cart.id).await?;

    Ok(Json(ApiResponse::data(CartView::assemble(&cart, Vec::new()))))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_single_item_payload_deserializes() {
        let body: AddItemsRequest =
            serde_json::from_str(r#"{"product_id": 1, "quantity": 2}"#).unwrap();
        let items = body.into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items.first().unwrap().product_id, Some(1));
    }

    #[test]
    fn test_item_list_payload_deserializes() {
        let body: AddItemsRequest = serde_json::from_str(
            r#"[{"product_id": 1, "quantity": 2}, {"product_id": 3, "quantity": 1}]"#,
        )
        .unwrap();
        assert_eq!(body.into_vec().len(), 2);
    }

    #[test]
    fn test_validate_rejects_empty_batch() {
        assert!(validate_items(&[]).is_err());
    }

    #[test]
    fn test_validate_names_offending_index() {
        let items = vec![
            CartItemPayload {
                product_id: Some(1),
                quantity: Some(2),
            },
            CartItemPayload {
                product_id: None,
                quantity: Some(1),
            },
        ];

        let err = validate_items(&items).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn test_validate_rejects_non_positive_quantity() {
        for quantity in [Some(0), Some(-3), None] {
            let items = vec![CartItemPayload {
                product_id: Some(1),
                quantity,
            }];
            let err = validate_items(&items).unwrap_err();
            assert!(err.to_string().contains("positive integer"));
        }
    }

    #[test]
    fn test_validate_passes_well_formed_batch() {
        let items = vec![
            CartItemPayload {
                product_id: Some(1),
                quantity: Some(2),
            },
            CartItemPayload {
                product_id: Some(9),
                quantity: Some(1),
            },
        ];

        let validated = validate_items(&items).unwrap();
        assert_eq!(validated.len(), 2);
        assert_eq!(validated.first().unwrap().quantity, 2);
    }
}
