use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    database::{fetch_user, insert_user, is_unique_violation},
    error::AppError,
};

pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims: the respondent identity and expiry in seconds since epoch.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Absent fields deserialize to empty strings so validation reports the
/// missing field instead of a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST).map_err(|e| AppError::Internal(e.into()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

pub fn issue_token(username: &str, secret: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: username.to_string(),
        exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.into()))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidCredentials)
}

/// Store a new credential record and issue an immediate session token.
pub async fn signup(
    pool: &SqlitePool,
    secret: &str,
    request: &SignupRequest,
) -> Result<String, AppError> {
    if request.username.trim().is_empty()
        || request.email.trim().is_empty()
        || request.password.is_empty()
    {
        return Err(AppError::Validation(
            "Missing username, email, or password".to_string(),
        ));
    }

    let password_hash = hash_password(&request.password)?;

    insert_user(pool, &request.username, &request.email, &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::DuplicateIdentity("Username or email already exists".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    issue_token(&request.username, secret)
}

/// Check credentials and issue a token valid for 24 hours.
///
/// Unknown username and bad password are indistinguishable to the caller.
pub async fn login(
    pool: &SqlitePool,
    secret: &str,
    request: &LoginRequest,
) -> Result<String, AppError> {
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(AppError::Validation(
            "Missing username or password".to_string(),
        ));
    }

    let user = fetch_user(pool, &request.username).await?;

    match user {
        Some(user) if verify_password(&request.password, &user.password_hash) => {
            issue_token(&user.username, secret)
        }
        _ => Err(AppError::InvalidCredentials),
    }
}
