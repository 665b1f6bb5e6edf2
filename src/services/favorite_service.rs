use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::errors::AppError;
use crate::models::dto::{AddFavoriteRequest, FavoriteCheck, FavoriteWithRecipe};
use crate::models::{favorite, recipe};
use crate::services::access::{self, Actor};

pub struct FavoriteService;

impl FavoriteService {
    /// Ajoute une recette aux favoris de l'acteur (une seule fois par recette)
    pub async fn add(
        db: &DatabaseConnection,
        actor: &Actor,
        request: AddFavoriteRequest,
    ) -> Result<favorite::Model, AppError> {
        let target = recipe::Entity::find_by_id(request.recipe_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        if !access::can_view_recipe(Some(actor), &target) {
            return Err(AppError::not_found("Recipe"));
        }

        let new_favorite = favorite::ActiveModel {
            user_id: Set(actor.id),
            recipe_id: Set(request.recipe_id),
            notes: Set(request.notes.map(|n| n.trim().to_string()).unwrap_or_default()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let created = new_favorite.insert(db).await.map_err(|e| match AppError::from(e) {
            AppError::Duplicate(_) => AppError::Duplicate("Recipe already in favorites".to_string()),
            other => other,
        })?;

        info!(favorite_id = created.id, recipe_id = created.recipe_id, user_id = actor.id, "Recipe added to favorites");

        Ok(created)
    }

    /// Favoris d'un utilisateur : lui-même ou un admin
    pub async fn list_for_user(
        db: &DatabaseConnection,
        actor: &Actor,
        user_id: i32,
    ) -> Result<Vec<FavoriteWithRecipe>, AppError> {
        if actor.id != user_id && !access::is_admin(actor) {
            return Err(AppError::forbidden("Access denied: you can only view your own favorites"));
        }

        let rows = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::Id)
            .find_also_related(recipe::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(favorite, recipe)| FavoriteWithRecipe { favorite, recipe })
            .collect())
    }

    pub async fn check(db: &DatabaseConnection, actor: &Actor, recipe_id: i32) -> Result<FavoriteCheck, AppError> {
        let found = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(actor.id))
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .one(db)
            .await?;

        Ok(FavoriteCheck {
            success: true,
            is_favorited: found.is_some(),
            favorite_id: found.map(|f| f.id),
        })
    }

    /// Propriétaire ou admin
    pub async fn remove(db: &DatabaseConnection, actor: &Actor, favorite_id: i32) -> Result<(), AppError> {
        let current = favorite::Entity::find_by_id(favorite_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Favorite"))?;

        access::ensure_can_delete(actor, &current)?;

        favorite::Entity::delete_by_id(favorite_id).exec(db).await?;
        info!(favorite_id, actor_id = actor.id, "Favorite removed");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::moderation::ModerationService;
    use crate::services::test_support::Fixture;

    async fn approved_recipe(db: &DatabaseConnection, fixture: &Fixture) -> recipe::Model {
        let pending = fixture.recipe(db, fixture.alice.id).await;
        ModerationService::approve(db, &fixture.admin_actor(), pending.id).await.unwrap()
    }

    fn request(recipe_id: i32) -> AddFavoriteRequest {
        AddFavoriteRequest {
            recipe_id,
            notes: Some("  try with basil ".to_string()),
        }
    }

    #[tokio::test]
    async fn test_add_twice_is_duplicate() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = approved_recipe(&db, &fixture).await;

        let first = FavoriteService::add(&db, &fixture.bob_actor(), request(recipe.id)).await.unwrap();
        assert_eq!(first.notes, "try with basil");

        let second = FavoriteService::add(&db, &fixture.bob_actor(), request(recipe.id)).await;
        assert!(matches!(second, Err(AppError::Duplicate(_))));
        assert_eq!(favorite::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_check_reports_favorite_id() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = approved_recipe(&db, &fixture).await;

        let before = FavoriteService::check(&db, &fixture.bob_actor(), recipe.id).await.unwrap();
        assert!(!before.is_favorited);
        assert!(before.favorite_id.is_none());

        let added = FavoriteService::add(&db, &fixture.bob_actor(), request(recipe.id)).await.unwrap();
        let after = FavoriteService::check(&db, &fixture.bob_actor(), recipe.id).await.unwrap();
        assert!(after.is_favorited);
        assert_eq!(after.favorite_id, Some(added.id));
    }

    #[tokio::test]
    async fn test_list_is_private_except_for_admin() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = approved_recipe(&db, &fixture).await;
        FavoriteService::add(&db, &fixture.bob_actor(), request(recipe.id)).await.unwrap();

        let own = FavoriteService::list_for_user(&db, &fixture.bob_actor(), fixture.bob.id).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].recipe.as_ref().unwrap().id, recipe.id);

        let as_admin = FavoriteService::list_for_user(&db, &fixture.admin_actor(), fixture.bob.id).await.unwrap();
        assert_eq!(as_admin.len(), 1);

        let snooping = FavoriteService::list_for_user(&db, &fixture.alice_actor(), fixture.bob.id).await;
        assert!(matches!(snooping, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_remove_owner_or_admin() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = approved_recipe(&db, &fixture).await;
        let favorite = FavoriteService::add(&db, &fixture.bob_actor(), request(recipe.id)).await.unwrap();

        let stranger = FavoriteService::remove(&db, &fixture.alice_actor(), favorite.id).await;
        assert!(matches!(stranger, Err(AppError::Forbidden(_))));

        FavoriteService::remove(&db, &fixture.admin_actor(), favorite.id).await.unwrap();
        let gone = FavoriteService::remove(&db, &fixture.bob_actor(), favorite.id).await;
        assert!(matches!(gone, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_recipe() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;

        let result = FavoriteService::add(&db, &fixture.bob_actor(), request(77)).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_pending_recipe_of_someone_else_is_not_found() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let pending = fixture.recipe(&db, fixture.alice.id).await;

        let stranger = FavoriteService::add(&db, &fixture.bob_actor(), request(pending.id)).await;
        assert!(matches!(stranger, Err(AppError::NotFound(_))));

        let owner = FavoriteService::add(&db, &fixture.alice_actor(), request(pending.id)).await;
        assert!(owner.is_ok());

        ModerationService::reject(&db, &fixture.admin_actor(), pending.id, Some("Missing quantities"))
            .await
            .unwrap();
        let rejected = FavoriteService::add(&db, &fixture.bob_actor(), request(pending.id)).await;
        assert!(matches!(rejected, Err(AppError::NotFound(_))));
        assert_eq!(favorite::Entity::find().count(&db).await.unwrap(), 1);
    }
}
