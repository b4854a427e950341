use crate::{
    auth::{generate_token, hash_password, verify_password, CurrentUser},
    config::Config,
    error::AppError,
    models::{TokenResponse, User, UserCreate, UserLogin, UserResponse},
};
use actix_web::{get, post, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

const USER_COLUMNS: &str = "id, email, name, email_verified, password_hash, created_at";

/// Sign up
///
/// Creates a new account and returns a bearer token for it.
///
/// ## Responses:
/// - `201 Created`: `TokenResponse` with the token and the new user.
/// - `400 Bad Request`: the email is already registered.
/// - `422 Unprocessable Entity`: invalid email, password or name.
#[post("/signup")]
pub async fn signup(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user_data: web::Json<UserCreate>,
) -> Result<impl Responder, AppError> {
    user_data.validate()?;
    let UserCreate {
        email,
        password,
        name,
    } = user_data.into_inner();

    let existing_user = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool.get_ref())
        .await?;

    if existing_user.is_some() {
        return Err(email_taken());
    }

    // No pool slot is held while bcrypt runs.
    let cost = config.auth.bcrypt_cost;
    let password_hash = web::block(move || hash_password(&password, cost)).await??;

    let user = User::new(email, name, password_hash);

    let mut conn = pool.acquire().await?;

    let inserted = sqlx::query(
        "INSERT INTO users (id, email, name, email_verified, password_hash, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(user.email_verified)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(&mut *conn)
    .await;

    match inserted {
        Ok(_) => {}
        // Lost a race with a concurrent signup for the same email.
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            return Err(email_taken());
        }
        Err(e) => return Err(e.into()),
    }

    let access_token = generate_token(&user.id, &user.email, &config.auth)?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(TokenResponse::bearer(access_token, user.into())))
}

/// Sign in
///
/// Verifies the email and password and returns a bearer token.
///
/// ## Responses:
/// - `200 OK`: `TokenResponse`.
/// - `401 Unauthorized`: unknown email or wrong password.
/// - `422 Unprocessable Entity`: malformed payload.
#[post("/signin")]
pub async fn signin(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    credentials: web::Json<UserLogin>,
) -> Result<impl Responder, AppError> {
    credentials.validate()?;
    let UserLogin { email, password } = credentials.into_inner();

    // The connection goes back to the pool before the password is checked.
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {} FROM users WHERE email = $1",
        USER_COLUMNS
    ))
    .bind(&email)
    .fetch_optional(pool.get_ref())
    .await?;

    let Some(user) = user else {
        log::warn!("sign-in attempt for unknown email");
        return Err(invalid_credentials());
    };

    let password_hash = user.password_hash.clone();
    let valid = web::block(move || verify_password(&password, &password_hash)).await??;
    if !valid {
        log::warn!("wrong password for user {}", user.id);
        return Err(invalid_credentials());
    }

    let access_token = generate_token(&user.id, &user.email, &config.auth)?;
    log::info!("user {} signed in", user.id);

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(access_token, user.into())))
}

/// Current session
///
/// Returns the user the bearer token belongs to.
#[get("/session")]
pub async fn session(current_user: CurrentUser) -> impl Responder {
    HttpResponse::Ok().json(UserResponse::from(current_user.0))
}

/// Current user
///
/// Same contract as `/session`.
#[get("/me")]
pub async fn me(current_user: CurrentUser) -> impl Responder {
    HttpResponse::Ok().json(UserResponse::from(current_user.0))
}

/// Sign out
///
/// Tokens are stateless; the client discards its copy.
#[post("/signout")]
pub async fn signout() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Signed out successfully"
    }))
}

fn email_taken() -> AppError {
    AppError::BadRequest("Email already registered".into())
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".into())
}
