//! User and authentication route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use tienda_core::{Role, UserId};

use crate::db::UserRepository;
use crate::db::users::UserChanges;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::user::PublicUser;
use crate::response::ApiResponse;
use crate::services::auth::{AuthService, RegisterInput, hash_password, validate_password};
use crate::services::token;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration payload.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Login payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update payload. Role changes are honored for administrators only.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// Token plus the public view of its user, returned on register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /users` - register a new account (public).
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>)> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    let user = AuthService::new(state.pool())
        .register(RegisterInput {
            name: name.to_string(),
            email: body.email,
            password: body.password,
            address: body.address,
            phone: body.phone,
        })
        .await?;

    let token = token::sign(
        user.id,
        user.role,
        &state.config().jwt_secret,
        state.config().jwt_expiry_hours,
    )?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(AuthResponse {
            token,
            user: PublicUser::from(&user),
        })),
    ))
}

/// `POST /users/login` - exchange credentials for a token (public).
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "email and password are required".to_string(),
        ));
    }

    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    let token = token::sign(
        user.id,
        user.role,
        &state.config().jwt_secret,
        state.config().jwt_expiry_hours,
    )?;

    Ok(Json(ApiResponse::data(AuthResponse {
        token,
        user: PublicUser::from(&user),
    })))
}

/// `GET /users/me` - the authenticated user's own profile.
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ApiResponse<crate::models::user::User>>> {
    let profile = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(Json(ApiResponse::data(profile)))
}

/// `PATCH /users/{id}` - update a profile (self or administrator).
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(requester): RequireAuth,
    Path(id): Path<i32>,
    ApiJson(body): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<crate::models::user::User>>> {
    let target = UserId::new(id);

    if !requester.can_act_for(target) {
        return Err(AppError::Forbidden(
            "you do not have permission to modify this user".to_string(),
        ));
    }

    if body.role.is_some() && !requester.role.is_administrator() {
        return Err(AppError::Forbidden(
            "only administrators can change roles".to_string(),
        ));
    }

    let password_hash = match body.password.as_deref() {
        Some(password) => {
            validate_password(password)?;
            Some(hash_password(password)?)
        }
        None => None,
    };

    let changes = UserChanges {
        name: body.name,
        address: body.address,
        phone: body.phone,
        password_hash,
        role: body.role,
    };

    if changes.is_empty() {
        return Err(AppError::Validation(
            "no updatable fields provided".to_string(),
        ));
    }

    let user = UserRepository::new(state.pool())
        .update(target, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(Json(ApiResponse::data(user)))
}

/// `DELETE /users/{id}` - delete an account (self or administrator).
///
/// An administrator deleting their own account is blocked so a store cannot
/// casually lose its last administrator.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(requester): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<serde_json::Value>>> {
    let target = UserId::new(id);

    if !requester.can_act_for(target) {
        return Err(AppError::Forbidden(
            "you do not have permission to delete this user".to_string(),
        ));
    }

    if requester.role.is_administrator() && requester.id == target {
        return Err(AppError::Forbidden(
            "administrators cannot delete their own account".to_string(),
        ));
    }

    let deleted = UserRepository::new(state.pool()).delete(target).await?;
    if !deleted {
        return Err(AppError::NotFound("user not found".to_string()));
    }

    tracing::info!(user_id = %target, deleted_by = %requester.id, "user deleted");

    Ok(Json(ApiResponse::empty()))
}

/// `GET /users` - list all accounts (administrator only).
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<ApiResponse<Vec<crate::models::user::User>>>> {
    let users = UserRepository::new(state.pool()).list_all().await?;

    Ok(Json(ApiResponse::list(users)))
}
