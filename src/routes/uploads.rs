use actix_web::{get, http::header, post, web, HttpRequest, HttpResponse};
use serde::Serialize;
use std::path::Path;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::ApiResponse;
use crate::services::upload_service::UploadService;

#[derive(Serialize)]
pub struct UploadedFile {
    pub path: String,
}

/// POST /api/uploads - Image brute dans le body, Content-Type image/* (PROTÉGÉE)
#[post("")]
pub async fn upload_image(
    auth_user: AuthUser,
    req: HttpRequest,
    body: web::Bytes,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let path = UploadService::save_image(&config.upload_dir, content_type, &body).await?;
    tracing::debug!(user_id = auth_user.user_id, path = %path, "Upload stored");

    Ok(HttpResponse::Created().json(ApiResponse::ok("File uploaded successfully", UploadedFile { path })))
}

/// GET /uploads/{file} - Sert les images enregistrées (PUBLIC)
#[get("/uploads/{file}")]
pub async fn serve_upload(path: web::Path<String>, config: web::Data<AppConfig>) -> Result<HttpResponse, AppError> {
    let file_name = path.into_inner();

    // Noms générés par UploadService uniquement : pas de sous-dossier
    if file_name.contains('/') || file_name.contains('\\') || file_name.starts_with('.') {
        return Err(AppError::not_found("File"));
    }

    let content_type = match Path::new(&file_name).extension().and_then(|e| e.to_str()) {
        Some("jpg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => return Err(AppError::not_found("File")),
    };

    let bytes = tokio::fs::read(Path::new(&config.upload_dir).join(&file_name))
        .await
        .map_err(|_| AppError::not_found("File"))?;

    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}

pub fn upload_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/uploads")
            .app_data(crate::routes::upload_payload_config())
            .service(upload_image),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    use crate::models::users::Role;
    use crate::services::test_support::insert_user;
    use crate::utils::jwt;

    #[actix_web::test]
    async fn test_upload_then_serve() {
        let db = crate::db::test_connection().await;
        let config = AppConfig::for_tests();
        let alice = insert_user(&db, "alice", Role::User).await;
        let token = jwt::generate_token(&config, alice.id, Role::User).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(config))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .insert_header((header::CONTENT_TYPE, "image/gif"))
            .set_payload("GIF89a")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let path = body["data"]["path"].as_str().unwrap().to_string();
        assert!(path.starts_with("/uploads/") && path.ends_with(".gif"));

        let req = test::TestRequest::get().uri(&path).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await.as_ref(), b"GIF89a");

        let req = test::TestRequest::post()
            .uri("/api/uploads")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .insert_header((header::CONTENT_TYPE, "text/plain"))
            .set_payload("hello")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }
}
