use std::io;

use actix_web::{middleware::Logger, web, App, HttpServer};
use todo_api::{config::Config, db, routes, security::SecurityHeaders, startup};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // The schema is owned by the `migrate` binary; the server never alters it.
    let pool = db::connect(&config.database)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    log::info!("Starting {}", config.app_name);
    log::info!("Environment: {}", config.environment);
    log::info!("Listening on {}", config.server_url());

    let addr = config.server_addr();
    let config_data = web::Data::new(config);
    let pool_data = web::Data::new(pool.clone());

    HttpServer::new(move || {
        // Registered last = outermost: logger, then security headers, then CORS.
        App::new()
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .wrap(startup::cors(&config_data))
            .wrap(SecurityHeaders::new(config_data.is_production()))
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind(addr)?
    .run()
    .await?;

    pool.close().await;
    log::info!("Shutting down");
    Ok(())
}
