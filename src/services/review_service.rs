use chrono::Utc;
use sea_orm::*;
use tracing::info;

use crate::errors::AppError;
use crate::models::dto::{CreateReviewRequest, ReviewWithAuthor, UpdateReviewRequest};
use crate::models::{recipe, review, users};
use crate::services::access::{self, Actor};
use crate::services::rating_service::RatingService;

pub struct ReviewService;

impl ReviewService {
    /// Ajoute l'avis de l'acteur. Le doublon (user, recette) est refusé par
    /// l'index unique, y compris quand deux requêtes arrivent en même temps.
    pub async fn create(
        db: &DatabaseConnection,
        actor: &Actor,
        request: CreateReviewRequest,
    ) -> Result<review::Model, AppError> {
        recipe::Entity::find_by_id(request.recipe_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        let now = Utc::now();
        let new_review = review::ActiveModel {
            user_id: Set(actor.id),
            recipe_id: Set(request.recipe_id),
            rating: Set(request.rating),
            comment: Set(request.comment.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let created = new_review.insert(db).await.map_err(|e| match AppError::from(e) {
            AppError::Duplicate(_) => AppError::Duplicate("You already reviewed this recipe".to_string()),
            other => other,
        })?;

        info!(review_id = created.id, recipe_id = created.recipe_id, user_id = actor.id, "Review added");
        RatingService::recompute_after_mutation(db, created.recipe_id).await;

        Ok(created)
    }

    /// Avis d'une recette, plus récents d'abord
    pub async fn list_for_recipe(
        db: &DatabaseConnection,
        recipe_id: i32,
    ) -> Result<Vec<ReviewWithAuthor>, AppError> {
        let rows = review::Entity::find()
            .filter(review::Column::RecipeId.eq(recipe_id))
            .order_by_desc(review::Column::CreatedAt)
            .order_by_desc(review::Column::Id)
            .find_also_related(users::Entity)
            .all(db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(review, author)| ReviewWithAuthor {
                review,
                author: author.map(Into::into),
            })
            .collect())
    }

    /// Seul l'auteur modifie son avis
    pub async fn update(
        db: &DatabaseConnection,
        actor: &Actor,
        review_id: i32,
        request: UpdateReviewRequest,
    ) -> Result<review::Model, AppError> {
        let current = review::Entity::find_by_id(review_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Review"))?;

        access::ensure_can_update(actor, &current)?;

        let mut active: review::ActiveModel = current.into();
        if let Some(rating) = request.rating {
            active.rating = Set(rating);
        }
        if let Some(comment) = request.comment {
            active.comment = Set(comment.trim().to_string());
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(db).await?;

        info!(review_id, recipe_id = updated.recipe_id, "Review updated");
        RatingService::recompute_after_mutation(db, updated.recipe_id).await;

        Ok(updated)
    }

    /// Auteur ou admin
    pub async fn delete(db: &DatabaseConnection, actor: &Actor, review_id: i32) -> Result<(), AppError> {
        let current = review::Entity::find_by_id(review_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("Review"))?;

        access::ensure_can_delete(actor, &current)?;

        let recipe_id = current.recipe_id;
        review::Entity::delete_by_id(review_id).exec(db).await?;

        info!(review_id, recipe_id, actor_id = actor.id, "Review deleted");
        RatingService::recompute_after_mutation(db, recipe_id).await;

        Ok(())
    }
}
