//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying the user id and role, signed with the
//! server secret and expiring after a configurable number of hours.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use tienda_core::{Role, UserId};

use super::auth::AuthError;

/// Claims carried by every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: i32,
    /// Role at issuance time.
    pub role: Role,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

impl Claims {
    /// The user ID as a typed ID.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        UserId::new(self.sub)
    }
}

/// Sign a token for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenCreation` if signing fails.
pub fn sign(
    user_id: UserId,
    role: Role,
    secret: &SecretString,
    expiry_hours: i64,
) -> Result<String, AuthError> {
    let exp = Utc::now()
        .checked_add_signed(Duration::hours(expiry_hours))
        .ok_or(AuthError::TokenCreation)?
        .timestamp();

    let claims = Claims {
        sub: user_id.as_i32(),
        role,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .map_err(|_| AuthError::TokenCreation)
}

/// Verify a token's signature and expiry, returning its claims.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` for an expired token and
/// `AuthError::InvalidToken` for any other verification failure.
pub fn verify(token: &str, secret: &SecretString) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("kJ8#mP2$vL9@qR4!wX7&nB5^zT0*cF3%")
    }

    #[test]
    fn test_sign_verify_roundtrip() {
        let token = sign(UserId::new(42), Role::Administrator, &secret(), 24).unwrap();
        let claims = verify(&token, &secret()).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.user_id(), UserId::new(42));
        assert_eq!(claims.role, Role::Administrator);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign(UserId::new(1), Role::Customer, &secret(), 24).unwrap();
        let other = SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6!");

        assert!(matches!(
            verify(&token, &other),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = sign(UserId::new(1), Role::Customer, &secret(), 24).unwrap();
        let tampered = format!("{token}x");

        assert!(matches!(
            verify(&tampered, &secret()),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Issued two hours in the past, beyond the default leeway.
        let token = sign(UserId::new(1), Role::Customer, &secret(), -2).unwrap();

        assert!(matches!(
            verify(&token, &secret()),
            Err(AuthError::TokenExpired)
        ));
    }
}
