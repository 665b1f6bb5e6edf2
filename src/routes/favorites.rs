use actix_web::{delete, get, post, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{AddFavoriteRequest, ApiResponse};
use crate::services::favorite_service::FavoriteService;

/// POST /api/favorites (PROTÉGÉE)
#[post("")]
pub async fn add_favorite(
    auth_user: AuthUser,
    body: web::Json<AddFavoriteRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().normalized();
    request.validate()?;

    let favorite = FavoriteService::add(db.get_ref(), &auth_user.actor(), request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok("Recipe added to favorites", favorite)))
}

/// GET /api/favorites/user/{user_id} - Soi-même ou admin (PROTÉGÉE)
#[get("/user/{user_id}")]
pub async fn list_user_favorites(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let favorites = FavoriteService::list_for_user(db.get_ref(), &auth_user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Favorites retrieved", favorites)))
}

/// GET /api/favorites/check/{recipe_id} - Pour l'appelant (PROTÉGÉE)
#[get("/check/{recipe_id}")]
pub async fn check_favorite(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let check = FavoriteService::check(db.get_ref(), &auth_user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(check))
}

/// DELETE /api/favorites/{id} - Propriétaire ou admin (PROTÉGÉE)
#[delete("/{id}")]
pub async fn remove_favorite(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    FavoriteService::remove(db.get_ref(), &auth_user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Recipe removed from favorites")))
}

pub fn favorite_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/favorites")
            .service(add_favorite)
            .service(list_user_favorites)
            .service(check_favorite)
            .service(remove_favorite),
    );
}
