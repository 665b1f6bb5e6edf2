pub mod admin;
pub mod auth;
pub mod favorites;
pub mod health;
pub mod recipes;
pub mod reviews;
pub mod uploads;

use actix_web::{error, web};

use crate::errors::AppError;

// Taille max d'une image envoyée sur /api/uploads
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .app_data(path_config())
        .service(
            web::scope("/api")
                .service(health::health_check)
                .configure(auth::auth_routes)
                .configure(recipes::recipe_routes)
                .configure(reviews::review_routes)
                .configure(favorites::favorite_routes)
                .configure(admin::admin_routes)
                .configure(uploads::upload_routes),
        )
        .service(uploads::serve_upload);
}

// Les erreurs de désérialisation sortent dans la même enveloppe que le reste

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            error::JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
            other => format!("Invalid JSON body: {}", other),
        };
        AppError::Validation(message).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid query string: {}", err)).into())
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid path parameter: {}", err)).into())
}

pub(crate) fn upload_payload_config() -> web::PayloadConfig {
    web::PayloadConfig::new(MAX_UPLOAD_BYTES)
}
