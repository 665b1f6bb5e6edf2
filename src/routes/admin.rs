// Toutes les routes /api/admin : token admin ET compte admin toujours en base
// (services::access::require_admin_account)

use actix_web::{delete, get, put, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{AdminRecipeFilter, ApiResponse, RejectRequest};
use crate::models::recipe::RecipeStatus;
use crate::services::access::require_admin_account;
use crate::services::moderation::ModerationService;
use crate::services::recipe_service::RecipeService;
use crate::services::user_service::UserService;

/// GET /api/admin/users
#[get("/users")]
pub async fn list_users(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    require_admin_account(db.get_ref(), &auth_user.actor()).await?;

    let users = UserService::list_users(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Users retrieved", users)))
}

/// DELETE /api/admin/users/{id} - Jamais un admin
#[delete("/users/{id}")]
pub async fn delete_user(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_admin_account(db.get_ref(), &auth_user.actor()).await?;

    UserService::delete_user(db.get_ref(), &auth_user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User and all their content deleted successfully")))
}

/// GET /api/admin/stats
#[get("/stats")]
pub async fn get_stats(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    require_admin_account(db.get_ref(), &auth_user.actor()).await?;

    let stats = UserService::stats(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Statistics retrieved", stats)))
}

/// GET /api/admin/recipes/pending
#[get("/recipes/pending")]
pub async fn list_pending(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    require_admin_account(db.get_ref(), &auth_user.actor()).await?;

    let filter = AdminRecipeFilter { status: Some(RecipeStatus::Pending), source: None };
    let recipes = RecipeService::list_admin(db.get_ref(), &filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Pending recipes retrieved", recipes)))
}

/// GET /api/admin/recipes/all?status=&source=
#[get("/recipes/all")]
pub async fn list_all(
    auth_user: AuthUser,
    query: web::Query<AdminRecipeFilter>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_admin_account(db.get_ref(), &auth_user.actor()).await?;

    let recipes = RecipeService::list_admin(db.get_ref(), &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Recipes retrieved", recipes)))
}

/// PUT /api/admin/recipes/{id}/approve
#[put("/recipes/{id}/approve")]
pub async fn approve_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_admin_account(db.get_ref(), &auth_user.actor()).await?;

    let recipe = ModerationService::approve(db.get_ref(), &auth_user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Recipe approved successfully", recipe)))
}

/// PUT /api/admin/recipes/{id}/reject { reason }
/// Body absent = raison vide = refusé
#[put("/recipes/{id}/reject")]
pub async fn reject_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: Option<web::Json<RejectRequest>>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_admin_account(db.get_ref(), &auth_user.actor()).await?;

    let reason = body.and_then(|b| b.into_inner().reason);
    let recipe =
        ModerationService::reject(db.get_ref(), &auth_user.actor(), path.into_inner(), reason.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Recipe rejected", recipe)))
}

/// DELETE /api/admin/recipes/{id}
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_admin_account(db.get_ref(), &auth_user.actor()).await?;

    RecipeService::delete(db.get_ref(), &auth_user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Recipe deleted successfully")))
}

pub fn admin_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .service(list_users)
            .service(delete_user)
            .service(get_stats)
            .service(list_pending)
            .service(list_all)
            .service(approve_recipe)
            .service(reject_recipe)
            .service(delete_recipe),
    );
}
