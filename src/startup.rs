//! Pieces of the application shell shared by the server binary and the tests.

use actix_cors::Cors;

use crate::config::Config;

/// CORS policy built from the configured allow-list.
///
/// A `*` entry allows any origin. Credentials are allowed either way.
pub fn cors(config: &Config) -> Cors {
    let base = if config.cors_origins.iter().any(|origin| origin == "*") {
        Cors::default().allow_any_origin()
    } else {
        config
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    base.allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600)
}
