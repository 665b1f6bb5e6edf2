use actix_web::{get, web, HttpResponse};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::warn;

use crate::models::dto::ApiResponse;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /api/health - État du service et de la base (PUBLIC)
#[get("/health")]
pub async fn health_check(db: web::Data<DatabaseConnection>) -> HttpResponse {
    match db.ping().await {
        Ok(()) => HttpResponse::Ok().json(ApiResponse::ok(
            "Service is healthy",
            HealthStatus { status: "ok", database: "up" },
        )),
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            HttpResponse::ServiceUnavailable().json(ApiResponse {
                success: false,
                message: "Database is unreachable".to_string(),
                count: None,
                data: Some(HealthStatus { status: "degraded", database: "down" }),
            })
        }
    }
}
