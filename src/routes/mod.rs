pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route. Everything under `/api` sits behind `AuthMiddleware`,
/// which lets the public auth endpoints through.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(health::root)
        .service(health::health)
        .service(
            web::scope("/api")
                .wrap(AuthMiddleware)
                .service(
                    web::scope("/auth")
                        .service(auth::signup)
                        .service(auth::signin)
                        .service(auth::session)
                        .service(auth::me)
                        .service(auth::signout),
                )
                .service(
                    web::scope("/tasks")
                        .service(tasks::list_tasks)
                        .service(tasks::create_task)
                        .service(tasks::get_task)
                        .service(tasks::update_task)
                        .service(tasks::toggle_task)
                        .service(tasks::delete_task),
                ),
        );
}

/// Malformed or incomplete JSON bodies are validation failures (422).
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into())
}
