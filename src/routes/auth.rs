use actix_web::{get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{
    ApiResponse, AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
};
use crate::services::user_service::UserService;
use crate::utils::jwt;

/// POST /api/auth/register - Créer un compte (PUBLIC)
/// Un éventuel champ "role" dans le body est ignoré.
#[post("/register")]
pub async fn register(
    body: web::Json<RegisterRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().normalized();
    request.validate()?;

    let user = UserService::register(db.get_ref(), request).await?;
    let token = jwt::generate_token(config.get_ref(), user.id, user.role)?;

    Ok(HttpResponse::Created().json(AuthResponse {
        success: true,
        message: "User registered successfully".to_string(),
        token,
        data: user,
    }))
}

/// POST /api/auth/login - Se connecter (PUBLIC)
#[post("/login")]
pub async fn login(
    body: web::Json<LoginRequest>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    let user = UserService::login(db.get_ref(), &body).await?;
    let token = jwt::generate_token(config.get_ref(), user.id, user.role)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        data: user,
    }))
}

/// GET /api/auth/profile (PROTÉGÉE)
#[get("/profile")]
pub async fn get_profile(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let user = UserService::profile(db.get_ref(), &auth_user.actor()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Profile retrieved", user)))
}

/// PUT /api/auth/profile (PROTÉGÉE)
#[put("/profile")]
pub async fn update_profile(
    auth_user: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().normalized();
    request.validate()?;

    let user = UserService::update_profile(db.get_ref(), &auth_user.actor(), request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Profile updated successfully", user)))
}

/// PUT /api/auth/change-password (PROTÉGÉE)
#[put("/change-password")]
pub async fn change_password(
    auth_user: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    body.validate()?;

    UserService::change_password(db.get_ref(), &auth_user.actor(), &body).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Password changed successfully")))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(register)
            .service(login)
            .service(get_profile)
            .service(update_profile)
            .service(change_password),
    );
}
