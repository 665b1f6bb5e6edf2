use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{ApiResponse, CreateReviewRequest, UpdateReviewRequest};
use crate::services::review_service::ReviewService;

/// POST /api/reviews - Un seul avis par recette et par utilisateur (PROTÉGÉE)
#[post("")]
pub async fn create_review(
    auth_user: AuthUser,
    body: web::Json<CreateReviewRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().normalized();
    request.validate()?;

    let review = ReviewService::create(db.get_ref(), &auth_user.actor(), request).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok("Review added successfully", review)))
}

/// GET /api/reviews/recipe/{recipe_id} (PUBLIC)
#[get("/recipe/{recipe_id}")]
pub async fn list_recipe_reviews(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let reviews = ReviewService::list_for_recipe(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Reviews retrieved", reviews)))
}

/// PUT /api/reviews/{id} - Auteur uniquement (PROTÉGÉE)
#[put("/{id}")]
pub async fn update_review(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<UpdateReviewRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().normalized();
    request.validate()?;

    let review = ReviewService::update(db.get_ref(), &auth_user.actor(), path.into_inner(), request).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Review updated successfully", review)))
}

/// DELETE /api/reviews/{id} - Auteur ou admin (PROTÉGÉE)
#[delete("/{id}")]
pub async fn delete_review(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    ReviewService::delete(db.get_ref(), &auth_user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Review deleted successfully")))
}

pub fn review_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reviews")
            .service(create_review)
            .service(list_recipe_reviews)
            .service(update_review)
            .service(delete_review),
    );
}
