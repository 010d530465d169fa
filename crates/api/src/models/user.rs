//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tienda_core::{Email, Role, UserId};

/// A user account (domain type).
///
/// The password hash never leaves the `db` layer; this type is safe to
/// serialize into API responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address (unique, lowercased).
    pub email: Email,
    /// Authorization role.
    pub role: Role,
    /// Optional shipping address.
    pub address: Option<String>,
    /// Optional phone number.
    pub phone: Option<String>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The public view of a user returned alongside a freshly issued token.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: UserId,
    pub name: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }
}
