use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::config::Config;

/// Root endpoint
///
/// Identifies the service. Unauthenticated.
#[get("/")]
pub async fn root(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": format!("Welcome to {}", config.app_name),
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Health check endpoint
///
/// Always reports `healthy` along with the configured environment.
#[get("/health")]
pub async fn health(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "environment": config.environment
    }))
}
