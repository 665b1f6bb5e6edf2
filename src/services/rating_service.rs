use sea_orm::*;
use tracing::{debug, error};

use crate::errors::AppError;
use crate::models::{recipe, review};

pub struct RatingService;

/// Moyenne arrondie à 1 décimale, (0, 0) sans avis
pub fn aggregate(ratings: &[i32]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }

    let total: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let mean = total as f64 / ratings.len() as f64;

    ((mean * 10.0).round() / 10.0, ratings.len() as i32)
}

impl RatingService {
    /// Recalcule average_rating / total_reviews à partir de TOUS les avis de la recette.
    ///
    /// La ligne recipe est verrouillée pendant la relecture des avis, donc deux
    /// recalculs concurrents pour la même recette s'exécutent l'un après l'autre
    /// et le dernier à committer voit l'ensemble d'avis à jour.
    pub async fn recompute(db: &DatabaseConnection, recipe_id: i32) -> Result<recipe::Model, AppError> {
        let txn = db.begin().await?;

        let current = recipe::Entity::find_by_id(recipe_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        let ratings: Vec<i32> = review::Entity::find()
            .filter(review::Column::RecipeId.eq(recipe_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|r| r.rating)
            .collect();

        let (average_rating, total_reviews) = aggregate(&ratings);

        let mut active: recipe::ActiveModel = current.into();
        active.average_rating = Set(average_rating);
        active.total_reviews = Set(total_reviews);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        debug!(recipe_id, average_rating, total_reviews, "Recipe rating recomputed");

        Ok(updated)
    }

    /// Effet secondaire après une mutation d'avis : un échec ne défait pas
    /// la mutation, il est seulement journalisé. Le prochain recalcul réussi
    /// remet le cache d'aplomb.
    pub async fn recompute_after_mutation(db: &DatabaseConnection, recipe_id: i32) {
        if let Err(e) = Self::recompute(db, recipe_id).await {
            error!(recipe_id, error = %e, kind = e.kind(), "Failed to recompute recipe rating");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::Fixture;

    #[test]
    fn test_empty_set() {
        assert_eq!(aggregate(&[]), (0.0, 0));
    }

    #[test]
    fn test_mean_is_rounded_to_one_decimal() {
        assert_eq!(aggregate(&[4, 5]), (4.5, 2));
        assert_eq!(aggregate(&[5]), (5.0, 1));
        assert_eq!(aggregate(&[4, 4, 5]), (4.3, 3));
        assert_eq!(aggregate(&[1, 2, 2]), (1.7, 3));
    }

    #[tokio::test]
    async fn test_failed_recompute_keeps_the_review() {
        let db = crate::db::test_connection().await;
        let fixture = Fixture::new(&db).await;
        let recipe = fixture.recipe(&db, fixture.alice.id).await;
        let review = fixture.review(&db, fixture.bob.id, recipe.id, 4).await;

        let missing = RatingService::recompute(&db, 4242).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        // l'échec est seulement journalisé
        RatingService::recompute_after_mutation(&db, 4242).await;

        assert!(review::Entity::find_by_id(review.id).one(&db).await.unwrap().is_some());
        let untouched = recipe::Entity::find_by_id(recipe.id).one(&db).await.unwrap().unwrap();
        assert_eq!(untouched.total_reviews, 0);

        RatingService::recompute_after_mutation(&db, recipe.id).await;
        let repaired = recipe::Entity::find_by_id(recipe.id).one(&db).await.unwrap().unwrap();
        assert_eq!(repaired.total_reviews, 1);
        assert_eq!(repaired.average_rating, 4.0);
    }
}
