use actix_web::{delete, get, post, put, web, HttpResponse};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::errors::AppError;
use crate::middleware::AuthUser;
use crate::models::dto::{ApiResponse, GenerateRequest, RecipeInput, SearchQuery};
use crate::models::recipe::Category;
use crate::services::ai_service::{AiService, RecipeGenerator};
use crate::services::recipe_service::RecipeService;

/// POST /api/recipes/generate - Brouillons IA, rien n'est enregistré (PUBLIC)
#[post("/generate")]
pub async fn generate_recipes(
    body: web::Json<GenerateRequest>,
    generator: web::Data<dyn RecipeGenerator>,
) -> Result<HttpResponse, AppError> {
    let drafts = AiService::generate(generator.get_ref(), body.into_inner().ingredients).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Recipes generated successfully", drafts)))
}

/// GET /api/recipes?search= - Recettes approuvées (PUBLIC)
#[get("")]
pub async fn list_recipes(
    query: web::Query<SearchQuery>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let recipes = RecipeService::list_public(db.get_ref(), query.search.as_deref()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Recipes retrieved", recipes)))
}

/// GET /api/recipes/category/{category} (PUBLIC)
#[get("/category/{category}")]
pub async fn list_by_category(
    path: web::Path<Category>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let recipes = RecipeService::list_by_category(db.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Recipes retrieved", recipes)))
}

/// GET /api/recipes/mine - Toutes mes recettes, tous statuts (PROTÉGÉE)
#[get("/mine")]
pub async fn list_mine(auth_user: AuthUser, db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let recipes = RecipeService::list_for_owner(db.get_ref(), &auth_user.actor()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::list("Your recipes", recipes)))
}

/// GET /api/recipes/{id} - Token optionnel : propriétaire et admin voient
/// aussi les recettes non approuvées
#[get("/{id}")]
pub async fn get_recipe(
    auth_user: Option<AuthUser>,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let viewer = auth_user.map(|user| user.actor());
    let recipe = RecipeService::get_visible(db.get_ref(), viewer.as_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Recipe retrieved", recipe)))
}

/// POST /api/recipes - Soumettre une recette, en attente d'approbation (PROTÉGÉE)
#[post("")]
pub async fn create_recipe(
    auth_user: AuthUser,
    body: web::Json<RecipeInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().normalized();
    input.validate()?;

    let recipe = RecipeService::create(db.get_ref(), &auth_user.actor(), input).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok("Recipe submitted for approval", recipe)))
}

/// PUT /api/recipes/{id} - Propriétaire uniquement, repasse en pending (PROTÉGÉE)
#[put("/{id}")]
pub async fn update_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    body: web::Json<RecipeInput>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let input = body.into_inner().normalized();
    input.validate()?;

    let recipe = RecipeService::update(db.get_ref(), &auth_user.actor(), path.into_inner(), input).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Recipe updated and resubmitted for approval", recipe)))
}

/// DELETE /api/recipes/{id} - Propriétaire ou admin (PROTÉGÉE)
#[delete("/{id}")]
pub async fn delete_recipe(
    auth_user: AuthUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    RecipeService::delete(db.get_ref(), &auth_user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Recipe deleted successfully")))
}

pub fn recipe_routes(cfg: &mut web::ServiceConfig) {
    // /mine et /category avant /{id}
    cfg.service(
        web::scope("/recipes")
            .service(generate_recipes)
            .service(list_recipes)
            .service(list_by_category)
            .service(list_mine)
            .service(get_recipe)
            .service(create_recipe)
            .service(update_recipe)
            .service(delete_recipe),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    use crate::config::AppConfig;
    use crate::models::users::Role;
    use crate::services::ai_service::FixedGenerator;
    use crate::services::test_support::insert_user;
    use crate::utils::jwt;

    fn recipe_body() -> Value {
        json!({
            "title": "Tomato Soup",
            "description": "A warm, simple soup.",
            "ingredients": [{ "name": "Tomato", "quantity": 4, "unit": "pieces" }],
            "instructions": [{ "step": 1, "description": "Simmer the tomatoes" }],
            "cookingTime": 10,
            "preparationTime": 5,
            "servings": 2,
            "category": "Lunch"
        })
    }

    #[actix_web::test]
    async fn test_submit_then_hidden_from_public() {
        let db = crate::db::test_connection().await;
        let config = AppConfig::for_tests();
        let alice = insert_user(&db, "alice", Role::User).await;
        let token = jwt::generate_token(&config, alice.id, Role::User).unwrap();
        let generator: Arc<dyn RecipeGenerator> = Arc::new(FixedGenerator(Vec::new()));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(config))
                .app_data(web::Data::from(generator))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(recipe_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["difficulty"], "Medium");
        let id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::get().uri("/api/recipes").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 0);

        let req = test::TestRequest::get().uri(&format!("/api/recipes/{}", id)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/recipes/{}", id))
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/recipes/mine")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["count"], 1);
    }

    #[actix_web::test]
    async fn test_invalid_payload_and_generate_without_ingredients() {
        let db = crate::db::test_connection().await;
        let config = AppConfig::for_tests();
        let alice = insert_user(&db, "alice", Role::User).await;
        let token = jwt::generate_token(&config, alice.id, Role::User).unwrap();
        let generator: Arc<dyn RecipeGenerator> = Arc::new(FixedGenerator(Vec::new()));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(db))
                .app_data(web::Data::new(config))
                .app_data(web::Data::from(generator))
                .configure(crate::routes::configure_routes),
        )
        .await;

        let mut body = recipe_body();
        body["ingredients"] = json!([]);
        let req = test::TestRequest::post()
            .uri("/api/recipes")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/recipes/generate")
            .set_json(json!({ "ingredients": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "validation_error");

        let req = test::TestRequest::get().uri("/api/recipes/category/Pasta").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
