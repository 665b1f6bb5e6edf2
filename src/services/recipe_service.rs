use chrono::Utc;
use sea_orm::*;
use sea_orm::sea_query::{Expr, Func};
use tracing::info;

use crate::errors::AppError;
use crate::models::dto::{AdminRecipeFilter, RecipeInput, RecipeWithAuthor};
use crate::models::recipe::{self, Category, RecipeStatus};
use crate::models::{favorite, review, users};
use crate::services::access::{self, Actor};
use crate::services::moderation::ModerationState;

pub struct RecipeService;

impl RecipeService {
    /// Crée une recette, toujours en attente de modération
    pub async fn create(
        db: &DatabaseConnection,
        actor: &Actor,
        input: RecipeInput,
    ) -> Result<recipe::Model, AppError> {
        let now = Utc::now();

        let mut active = recipe::ActiveModel {
            requested_by: Set(actor.id),
            average_rating: Set(0.0),
            total_reviews: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        fill_from_input(&mut active, input);
        ModerationState::Pending.apply(&mut active);

        let created = active.insert(db).await?;
        info!(recipe_id = created.id, owner_id = actor.id, "Recipe submitted for approval");

        Ok(created)
    }

    /// Modification par le propriétaire : la recette repasse en pending
    /// et perd son éventuel motif de rejet. Avis et favoris sont conservés.
    pub async fn update(
        db: &DatabaseConnection,
        actor: &Actor,
        recipe_id: i32,
        input: RecipeInput,
    ) -> Result<recipe::Model, AppError> {
        let txn = db.begin().await?;

        let current = recipe::Entity::find_by_id(recipe_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        access::ensure_can_update(actor, &current)?;

        let state = ModerationState::from_recipe(&current)?.resubmit();

        let mut active: recipe::ActiveModel = current.into();
        fill_from_input(&mut active, input);
        state.apply(&mut active);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        info!(recipe_id, owner_id = actor.id, "Recipe updated and resubmitted for approval");

        Ok(updated)
    }

    /// Suppression par le propriétaire ou un admin, avec ses avis et favoris
    pub async fn delete(db: &DatabaseConnection, actor: &Actor, recipe_id: i32) -> Result<(), AppError> {
        let txn = db.begin().await?;

        let current = recipe::Entity::find_by_id(recipe_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        access::ensure_can_delete(actor, &current)?;

        let reviews = review::Entity::delete_many()
            .filter(review::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await?;
        let favorites = favorite::Entity::delete_many()
            .filter(favorite::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await?;
        recipe::Entity::delete_by_id(recipe_id).exec(&txn).await?;

        txn.commit().await?;

        info!(
            recipe_id,
            actor_id = actor.id,
            reviews_deleted = reviews.rows_affected,
            favorites_deleted = favorites.rows_affected,
            "Recipe deleted"
        );

        Ok(())
    }

    /// Une recette non approuvée n'est visible que par son propriétaire et
    /// les admins ; pour les autres elle n'existe pas.
    pub async fn get_visible(
        db: &DatabaseConnection,
        viewer: Option<&Actor>,
        recipe_id: i32,
    ) -> Result<RecipeWithAuthor, AppError> {
        let (found, author) = recipe::Entity::find_by_id(recipe_id)
            .find_also_related(users::Entity)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        if !access::can_view_recipe(viewer, &found) {
            return Err(AppError::not_found("Recipe"));
        }

        Ok(RecipeWithAuthor::from((found, author)))
    }

    /// Flux public : seulement les recettes approuvées, plus récentes d'abord
    pub async fn list_public(
        db: &DatabaseConnection,
        search: Option<&str>,
    ) -> Result<Vec<RecipeWithAuthor>, AppError> {
        let mut query = recipe::Entity::find().filter(recipe::Column::Status.eq(RecipeStatus::Approved));

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(Func::lower(Expr::col((recipe::Entity, recipe::Column::Title)))).like(pattern.clone()))
                    .add(Expr::expr(Func::lower(Expr::col((recipe::Entity, recipe::Column::Description)))).like(pattern)),
            );
        }

        Self::with_authors(db, query).await
    }

    pub async fn list_by_category(
        db: &DatabaseConnection,
        category: Category,
    ) -> Result<Vec<RecipeWithAuthor>, AppError> {
        let query = recipe::Entity::find()
            .filter(recipe::Column::Status.eq(RecipeStatus::Approved))
            .filter(recipe::Column::Category.eq(category));

        Self::with_authors(db, query).await
    }

    /// Toutes les recettes du propriétaire, quel que soit leur statut
    pub async fn list_for_owner(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<recipe::Model>, AppError> {
        let recipes = recipe::Entity::find()
            .filter(recipe::Column::RequestedBy.eq(actor.id))
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id)
            .all(db)
            .await?;

        Ok(recipes)
    }

    /// Vue admin : tous les statuts, filtres optionnels status / source
    pub async fn list_admin(
        db: &DatabaseConnection,
        filter: &AdminRecipeFilter,
    ) -> Result<Vec<RecipeWithAuthor>, AppError> {
        let mut query = recipe::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(recipe::Column::Status.eq(status));
        }
        if let Some(source) = filter.source {
            query = query.filter(recipe::Column::Source.eq(source));
        }

        Self::with_authors(db, query).await
    }

    async fn with_authors(
        db: &DatabaseConnection,
        query: Select<recipe::Entity>,
    ) -> Result<Vec<RecipeWithAuthor>, AppError> {
        let rows = query
            .order_by_desc(recipe::Column::CreatedAt)
            .order_by_desc(recipe::Column::Id)
            .find_also_related(users::Entity)
            .all(db)
            .await?;

        Ok(rows.into_iter().map(RecipeWithAuthor::from).collect())
    }
}

/// Copie un payload déjà validé dans l'ActiveModel
fn fill_from_input(active: &mut recipe::ActiveModel, input: RecipeInput) {
    let input = input.normalized();

    active.title = Set(input.title);
    active.description = Set(input.description);
    active.ingredients = Set(recipe::Ingredients(input.ingredients));
    active.instructions = Set(recipe::Instructions(input.instructions));
    active.cooking_time = Set(input.cooking_time);
    active.preparation_time = Set(input.preparation_time);
    active.servings = Set(input.servings);
    active.difficulty = Set(input.difficulty);
    active.category = Set(input.category);
    active.tags = Set(recipe::Tags(input.tags));
    active.image = Set(input.image.unwrap_or_default());
    active.nutritional_info = Set(recipe::Nutrition(input.nutritional_info.unwrap_or_default()));
    active.source = Set(input.source);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::RecipeSource;
    use crate::models::users::Role;
    use crate::services::moderation::ModerationService;
    use crate::services::test_support::{self, Fixture};

    #[tokio::test]
    async fn test_new_recipe_is_pending_without_rating() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;

        let created = RecipeService::create(&db, &fixture.alice_actor(), test_support::tomato_soup())
            .await
            .unwrap();

        assert_eq!(created.title, "Tomato Soup");
        assert_eq!(created.status, RecipeStatus::Pending);
        assert_eq!(created.average_rating, 0.0);
        assert_eq!(created.total_reviews, 0);
        assert_eq!(created.requested_by, fixture.alice.id);
        assert!(created.rejection_reason.is_none());
        assert!(created.reviewed_by.is_none());
    }

    #[tokio::test]
    async fn test_public_feed_only_shows_approved() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let admin = fixture.admin_actor();

        let pending = fixture.recipe(&db, fixture.alice.id).await;
        let approved = fixture.recipe(&db, fixture.alice.id).await;
        let rejected = fixture.recipe(&db, fixture.bob.id).await;
        ModerationService::approve(&db, &admin, approved.id).await.unwrap();
        ModerationService::reject(&db, &admin, rejected.id, Some("Nope")).await.unwrap();

        let feed = RecipeService::list_public(&db, None).await.unwrap();
        let ids: Vec<i32> = feed.iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![approved.id]);
        assert_eq!(feed[0].author.as_ref().unwrap().pseudo, fixture.alice.pseudo);

        let lunch = RecipeService::list_by_category(&db, Category::Lunch).await.unwrap();
        assert_eq!(lunch.len(), 1);
        assert!(RecipeService::list_by_category(&db, Category::Dessert).await.unwrap().is_empty());

        let all = RecipeService::list_admin(&db, &AdminRecipeFilter { status: None, source: None })
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let only_pending = RecipeService::list_admin(
            &db,
            &AdminRecipeFilter { status: Some(RecipeStatus::Pending), source: Some(RecipeSource::Human) },
        )
        .await
        .unwrap();
        assert_eq!(only_pending.len(), 1);
        assert_eq!(only_pending[0].recipe.id, pending.id);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_public_only() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = fixture.recipe(&db, fixture.alice.id).await;

        assert!(RecipeService::list_public(&db, Some("tomato")).await.unwrap().is_empty());

        ModerationService::approve(&db, &fixture.admin_actor(), recipe.id).await.unwrap();
        assert_eq!(RecipeService::list_public(&db, Some("TOMATO")).await.unwrap().len(), 1);
        assert!(RecipeService::list_public(&db, Some("pancake")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_resets_approval() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = fixture.recipe(&db, fixture.alice.id).await;
        ModerationService::approve(&db, &fixture.admin_actor(), recipe.id).await.unwrap();

        let mut input = test_support::tomato_soup();
        input.title = "Roasted Tomato Soup".to_string();
        let updated = RecipeService::update(&db, &fixture.alice_actor(), recipe.id, input).await.unwrap();

        assert_eq!(updated.title, "Roasted Tomato Soup");
        assert_eq!(updated.status, RecipeStatus::Pending);
        assert!(updated.rejection_reason.is_none());
        assert!(updated.reviewed_by.is_none());
        assert!(updated.reviewed_at.is_none());
    }

    #[tokio::test]
    async fn test_edit_after_rejection_clears_reason() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = fixture.recipe(&db, fixture.alice.id).await;
        ModerationService::reject(&db, &fixture.admin_actor(), recipe.id, Some("No photo")).await.unwrap();

        let updated = RecipeService::update(&db, &fixture.alice_actor(), recipe.id, test_support::tomato_soup())
            .await
            .unwrap();
        assert_eq!(updated.status, RecipeStatus::Pending);
        assert!(updated.rejection_reason.is_none());
    }

    #[tokio::test]
    async fn test_admin_cannot_edit() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = fixture.recipe(&db, fixture.alice.id).await;

        let result = RecipeService::update(&db, &fixture.admin_actor(), recipe.id, test_support::tomato_soup()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_stranger_cannot_delete() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = fixture.recipe(&db, fixture.alice.id).await;

        let result = RecipeService::delete(&db, &fixture.bob_actor(), recipe.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert!(recipe::Entity::find_by_id(recipe.id).one(&db).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_reviews_and_favorites() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = fixture.recipe(&db, fixture.alice.id).await;
        let other = fixture.recipe(&db, fixture.alice.id).await;

        fixture.review(&db, fixture.bob.id, recipe.id, 4).await;
        fixture.review(&db, fixture.bob.id, other.id, 2).await;
        fixture.favorite(&db, fixture.bob.id, recipe.id).await;

        RecipeService::delete(&db, &fixture.admin_actor(), recipe.id).await.unwrap();

        assert!(recipe::Entity::find_by_id(recipe.id).one(&db).await.unwrap().is_none());
        let reviews = review::Entity::find().all(&db).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].recipe_id, other.id);
        assert_eq!(favorite::Entity::find().count(&db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_visibility_of_unapproved_recipe() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = fixture.recipe(&db, fixture.alice.id).await;

        assert!(RecipeService::get_visible(&db, Some(&fixture.alice_actor()), recipe.id).await.is_ok());
        assert!(RecipeService::get_visible(&db, Some(&fixture.admin_actor()), recipe.id).await.is_ok());
        assert!(matches!(
            RecipeService::get_visible(&db, Some(&fixture.bob_actor()), recipe.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            RecipeService::get_visible(&db, None, recipe.id).await,
            Err(AppError::NotFound(_))
        ));

        ModerationService::approve(&db, &fixture.admin_actor(), recipe.id).await.unwrap();
        assert!(RecipeService::get_visible(&db, None, recipe.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_list_for_owner_includes_every_status() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let first = fixture.recipe(&db, fixture.alice.id).await;
        fixture.recipe(&db, fixture.alice.id).await;
        fixture.recipe(&db, fixture.bob.id).await;
        ModerationService::reject(&db, &fixture.admin_actor(), first.id, Some("Duplicate")).await.unwrap();

        let mine = RecipeService::list_for_owner(&db, &Actor { id: fixture.alice.id, role: Role::User })
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
    }
}
