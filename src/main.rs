// src/main.rs
// DOCUMENTATION: Application entry point
// PURPOSE: Initialize config, database, and start HTTP server

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::io;

use storefinder::config::{self, Config};
use storefinder::handlers;
use storefinder::services::Mailer;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // 1. Load environment variables
    dotenv().ok();

    // 2. Load configuration
    let config = Config::from_env();
    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // 3. Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        // Use configured log level or default
        let log_level = if !config.log_level.is_empty() {
            &config.log_level
        } else {
            "info,actix_web=info,sqlx=warn"
        };
        std::env::set_var("RUST_LOG", log_level);
    }
    env_logger::init();

    log::info!("Starting storefinder...");
    log::info!("Environment: {}", config.environment);
    log::info!(
        "Server Address: {}:{}",
        config.server_address,
        config.server_port
    );

    // 4. Initialize database connection pool and apply migrations
    let pool = match config::init_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config::run_migrations(&pool).await {
        log::error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    // 5. Outgoing mail (runs disabled without SMTP_HOST)
    let mailer = match Mailer::from_config(&config) {
        Ok(mailer) => mailer,
        Err(e) => {
            log::error!("Failed to configure mailer: {}", e);
            std::process::exit(1);
        }
    };

    // 6. Session cookie signing key and uploads directory
    let session_key = Key::derive_from(config.session_secret.as_bytes());
    let secure_cookies = config.environment == "production";

    if let Err(e) = std::fs::create_dir_all(&config.uploads_dir) {
        log::error!("Failed to create uploads dir {}: {}", config.uploads_dir, e);
        std::process::exit(1);
    }

    // 7. Start HTTP server
    let server_addr = format!("{}:{}", config.server_address, config.server_port);
    let uploads_dir = config.uploads_dir.clone();
    let config_clone = config.clone();

    HttpServer::new(move || {
        App::new()
            // Application state (database pool, config, mailer)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config_clone.clone()))
            .app_data(web::Data::new(mailer.clone()))
            // Middleware
            .wrap(Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_secure(secure_cookies)
                    .build(),
            )
            // Static assets and uploaded photos
            .service(Files::new("/static", "static"))
            .service(Files::new("/uploads", uploads_dir.clone()))
            // Routes
            .configure(handlers::health_config)
            .configure(handlers::api_config)
            .configure(handlers::auth_config)
            .configure(handlers::users_config)
            .configure(handlers::reviews_config)
            .configure(handlers::stores_config)
    })
    .bind(&server_addr)?
    .run()
    .await
}
