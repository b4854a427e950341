use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::PgPool;
use std::ops::Deref;

use crate::auth::token::Claims;
use crate::error::AppError;
use crate::models::User;

/// The authenticated user behind the request's bearer token.
///
/// Relies on `AuthMiddleware` having stored verified `Claims` in the request
/// extensions. The user row is loaded by the token subject, so a token for a
/// deleted account is rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &User {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let pool = req.app_data::<web::Data<PgPool>>().cloned();

        Box::pin(async move {
            let claims = claims.ok_or_else(|| {
                AppError::Unauthorized("Not authenticated. Ensure AuthMiddleware is active.".into())
            })?;
            let pool = pool.ok_or_else(|| {
                AppError::InternalServerError("Database pool missing from app data".into())
            })?;

            let user = get_current_user(&pool, &claims).await?;
            Ok::<_, ActixError>(CurrentUser(user))
        })
    }
}

/// Loads the user named by the token subject.
pub async fn get_current_user(pool: &PgPool, claims: &Claims) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        "SELECT id, email, name, email_verified, password_hash, created_at FROM users WHERE id = $1",
    )
    .bind(&claims.sub)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Unauthorized("User not found".into()))
}
