mod config;
mod db;
mod errors;
mod middleware;
mod migrator;
mod models;
mod routes;
mod services;
mod utils;

use std::io;
use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::ai_service::{GeminiGenerator, RecipeGenerator};
use crate::services::user_service::UserService;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fridge_api=info,actix_web=info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Connecting to database...");
    let db = db::establish_connection(&config.database_url).await.map_err(|e| {
        error!(error = %e, "Failed to connect to database");
        io::Error::other(e.to_string())
    })?;
    info!("Database connected");

    if config.auto_migrate {
        db::migrate(&db).await.map_err(|e| {
            error!(error = %e, "Failed to run migrations");
            io::Error::other(e.to_string())
        })?;
    }

    if let Some(seed) = &config.admin_seed {
        UserService::ensure_admin(&db, seed).await.map_err(|e| {
            error!(error = %e, "Failed to create admin account");
            io::Error::other(e.to_string())
        })?;
    }

    if config.gemini_api_key.is_none() {
        info!("GEMINI_API_KEY not set, /api/recipes/generate will answer with an error");
    }

    let generator: Arc<dyn RecipeGenerator> = Arc::new(GeminiGenerator::from_config(&config));
    let bind = (config.host.clone(), config.port);

    info!("Starting server on http://{}:{}", bind.0, bind.1);

    let db = web::Data::new(db);
    let config = web::Data::new(config);
    let generator = web::Data::from(generator);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .app_data(generator.clone())
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
