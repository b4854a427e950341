use crate::config::AuthConfig;
use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Client-facing detail for every rejected token. The cause is only logged.
pub const INVALID_TOKEN: &str = "Invalid or expired token";

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: String,
    /// The user's email at the time the token was issued.
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Generates an HS256 JWT for a user.
///
/// The token expires after `config.token_ttl`.
///
/// # Returns
/// The encoded token, or `AppError::InternalServerError` if the expiry
/// overflows or encoding fails.
pub fn generate_token(user_id: &str, email: &str, config: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let expiration = now
        .checked_add_signed(config.token_ttl)
        .ok_or_else(|| AppError::InternalServerError("Token expiry out of range".into()))?;

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        iat: now.timestamp() as usize,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a JWT string and decodes its claims.
///
/// Signature and expiration are checked.
///
/// # Returns
/// `AppError::Unauthorized` with [`INVALID_TOKEN`] if the token is malformed,
/// its signature is invalid, or it has expired.
pub fn verify_token(token: &str, config: &AuthConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        log::debug!("token rejected: {:?}", e.kind());
        AppError::Unauthorized(INVALID_TOKEN.into())
    })
}
