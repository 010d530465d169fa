//! Administrator account management commands.
//!
//! # Usage
//!
//! ```bash
//! tienda-cli admin create -e admin@example.com -n "Admin Name" -p <password>
//! ```
//!
//! # Environment Variables
//!
//! - `TIENDA_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)

use sqlx::PgPool;
use thiserror::Error;

use tienda_api::services::auth::{AuthError, hash_password, validate_password};
use tienda_core::Email;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too weak.
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),
}

impl From<AuthError> for AdminError {
    fn from(e: AuthError) -> Self {
        Self::WeakPassword(e.to_string())
    }
}

/// Create a new administrator account.
///
/// # Arguments
///
/// * `email` - Administrator's email address
/// * `name` - Administrator's display name
/// * `password` - Plaintext password, hashed before it reaches the database
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns `AdminError` if validation fails, the email is taken, or the
/// database cannot be reached.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<i32, AdminError> {
    dotenvy::dotenv().ok();

    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    validate_password(password)?;
    let password_hash = hash_password(password)?;

    let database_url = std::env::var("TIENDA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| AdminError::MissingEnvVar("TIENDA_DATABASE_URL"))?;

    tracing::info!("Connecting to shop database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating administrator: {} ({})", name, email);

    // Check if user already exists
    let existing = sqlx::query_scalar::<_, i32>("SELECT id FROM shop.users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(AdminError::UserExists(email.into_inner()));
    }

    let id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO shop.users (name, email, password_hash, role) \
         VALUES ($1, $2, $3, 'administrator') \
         RETURNING id",
    )
    .bind(name)
    .bind(&email)
    .bind(&password_hash)
    .fetch_one(&pool)
    .await?;

    tracing::info!("Administrator created with id {id}");

    Ok(id)
}
