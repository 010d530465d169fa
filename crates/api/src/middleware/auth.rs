//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a verified bearer token in route
//! handlers. Verification checks the signature and expiry, then confirms the
//! token's user still exists; a deleted account invalidates its outstanding
//! tokens.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use tienda_core::{Role, UserId};

use crate::db::UserRepository;
use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::services::token;
use crate::state::AppState;

/// The principal derived from a verified token.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: Role,
}

impl CurrentUser {
    /// Whether this principal may act on the target user's resources:
    /// administrators may act on anyone, everyone else only on themselves.
    #[must_use]
    pub fn can_act_for(&self, target: UserId) -> bool {
        self.role.is_administrator() || self.id == target
    }
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Auth("access denied: no bearer token was provided".to_string())
        })?;

        let claims = token::verify(token, &state.config().jwt_secret)?;

        let exists = UserRepository::new(state.pool())
            .exists(claims.user_id())
            .await?;
        if !exists {
            return Err(AuthError::UserGone.into());
        }

        Ok(Self(CurrentUser {
            id: claims.user_id(),
            role: claims.role,
        }))
    }
}

/// Extractor that requires a valid bearer token carrying the administrator
/// role. Rejects authenticated non-administrators with 403.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if !user.role.is_administrator() {
            return Err(AppError::Forbidden(
                "you do not have permission to perform this action".to_string(),
            ));
        }

        Ok(Self(user))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts), Some("abc.def.ghi"));
    }

    #[test]
    fn test_missing_header_yields_none() {
        let parts = parts_with_auth(None);
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_non_bearer_scheme_yields_none() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert_eq!(bearer_token(&parts), None);
    }

    #[test]
    fn test_can_act_for() {
        let admin = CurrentUser {
            id: UserId::new(1),
            role: Role::Administrator,
        };
        let customer = CurrentUser {
            id: UserId::new(2),
            role: Role::Customer,
        };

        assert!(admin.can_act_for(UserId::new(99)));
        assert!(customer.can_act_for(UserId::new(2)));
        assert!(!customer.can_act_for(UserId::new(3)));
    }
}
