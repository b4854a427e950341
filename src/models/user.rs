use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::timestamp_now;

/// A registered account, as stored in the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// `user_` followed by 12 hex characters.
    pub id: String,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a new, unverified account with a freshly generated id.
    pub fn new(email: String, name: String, password_hash: String) -> Self {
        Self {
            id: generate_user_id(),
            email,
            name,
            email_verified: false,
            password_hash,
            created_at: timestamp_now(),
        }
    }
}

pub fn generate_user_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("user_{}", &hex[..12])
}

/// Signup payload.
#[derive(Debug, Deserialize, Validate)]
pub struct UserCreate {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// Signin payload.
#[derive(Debug, Deserialize, Validate)]
pub struct UserLogin {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Public view of a user. Never includes the password hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub email_verified: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            email_verified: user.email_verified,
        }
    }
}

/// Returned by signup and signin.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

impl TokenResponse {
    pub fn bearer(access_token: String, user: UserResponse) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            user,
        }
    }
}
