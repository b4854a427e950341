#![allow(dead_code)]

use std::str::FromStr;
use std::time::Duration;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;

use todo_api::config::{AuthConfig, Config, DatabaseConfig};
use todo_api::security::SecurityHeaders;
use todo_api::{db, routes, startup};

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> Config {
    dotenv::dotenv().ok();
    let ssl_mode = std::env::var("DB_SSL_MODE")
        .ok()
        .and_then(|mode| PgSslMode::from_str(&mode).ok())
        .unwrap_or(PgSslMode::Prefer);

    Config {
        app_name: "Todo API".to_string(),
        environment: "testing".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 8000,
        cors_origins: vec!["http://localhost:3000".to_string()],
        database: DatabaseConfig {
            url: std::env::var("DATABASE_URL").unwrap_or_default(),
            ssl_mode,
            pool_size: 1,
            max_overflow: 4,
            acquire_timeout: Duration::from_secs(5),
        },
        auth: AuthConfig {
            jwt_secret: TEST_SECRET.to_string(),
            token_ttl: chrono::Duration::hours(1),
            // bcrypt's minimum, keeps the suite fast.
            bcrypt_cost: 4,
        },
    }
}

/// A migrated pool on `DATABASE_URL`, or `None` (the caller skips) when it is unset.
pub async fn test_pool(config: &Config) -> Option<PgPool> {
    if config.database.url.is_empty() {
        eprintln!("DATABASE_URL not set; skipping database test");
        return None;
    }

    let pool = db::connect(&config.database)
        .await
        .expect("Failed to connect to test DB");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Some(pool)
}

/// A pool that never connects, for requests that are answered before any query.
pub fn unused_pool() -> PgPool {
    let options = PgConnectOptions::new()
        .host("127.0.0.1")
        .database("unused");
    PgPoolOptions::new().connect_lazy_with(options)
}

/// The application wired the same way as the server binary.
pub async fn init_app(
    pool: PgPool,
    config: Config,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    let cors = startup::cors(&config);
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(config))
            .wrap(cors)
            .wrap(SecurityHeaders::new(false))
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

/// An address nobody else in the suite uses, so tests can share one database.
pub fn unique_email(prefix: &str) -> String {
    format!("{}+{}@example.com", prefix, uuid::Uuid::new_v4().simple())
}

/// Sends a request and returns the status with the JSON body (`Null` when empty).
pub async fn send<S, B>(app: &S, req: Request) -> (StatusCode, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;

    if body.is_empty() {
        return (status, Value::Null);
    }
    let json = serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!(
            "Response body is not JSON ({}): {:?}",
            e,
            String::from_utf8_lossy(&body)
        )
    });
    (status, json)
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Signs up a user and returns `(user_id, access_token)`.
pub async fn signup_user<S, B>(app: &S, email: &str, password: &str, name: &str) -> (String, String)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": email, "password": password, "name": name }))
        .to_request();
    let (status, body) = send(app, req).await;
    assert_eq!(
        status,
        StatusCode::CREATED,
        "Setup: failed to sign up {}. Body: {}",
        email,
        body
    );

    let user_id = body["user"]["id"].as_str().expect("user.id").to_string();
    let token = body["access_token"].as_str().expect("access_token").to_string();
    (user_id, token)
}

pub async fn count_users(pool: &PgPool, email: &str) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .expect("Failed to count users")
}
