use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::database::models::{Role, User};
use crate::database::StoreError;

pub mod service;

pub use service::{AuthService, LoginOutcome, NewAccount};

/// Lowest cost bcrypt accepts
pub const MIN_BCRYPT_COST: u32 = 4;
/// Highest cost bcrypt accepts
pub const MAX_BCRYPT_COST: u32 = 31;

/// Session token payload. Stateless: expiry is the only invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub role: Role,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Claims expiring `expiry_hours` from now. A lifetime past chrono's
    /// range is an error, never a panic.
    pub fn for_user(user: &User, expiry_hours: u64) -> Result<Self, AuthError> {
        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::TokenGeneration(format!("token lifetime of {} hours is out of range", expiry_hours))
            })?;

        Ok(Self {
            email: user.email.clone(),
            role: user.role,
            name: user.name.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Password hashing error: {0}")]
    Hash(String),

    #[error("{0}")]
    Validation(String),

    #[error("Registration is disabled")]
    RegistrationDisabled,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry. No leeway: a token is dead the second its
/// `exp` passes.
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken(e.to_string()),
        })
}

/// bcrypt hash on the blocking pool
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// bcrypt compare on the blocking pool. A malformed stored hash never matches.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Hash(e.to_string()))?;

    match outcome {
        Ok(valid) => Ok(valid),
        Err(e) => {
            tracing::error!("Stored password hash is unusable: {}", e);
            Ok(false)
        }
    }
}
