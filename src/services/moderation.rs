// ============================================================================
// MODÉRATION DES RECETTES
// ============================================================================
//
// États:  Pending ──approve──▶ Approved
//            │  ▲                 │
//          reject └──resubmit──── reject
//            ▼                    ▼
//         Rejected ──approve──▶ Approved
//
//   - resubmit (édition par le propriétaire, depuis n'importe quel état)
//     → Pending, efface reason / reviewed_by / reviewed_at
//   - approve (admin, depuis Pending ou Rejected) → Approved
//     Approved → Approved est refusé (AlreadyApproved)
//   - reject (admin, depuis Pending ou Approved, raison non vide) → Rejected
//
// Chaque transition est une fonction pure sur ModerationState. Le service
// applique le résultat sur la ligne recipe dans une transaction, la ligne
// étant verrouillée pendant la décision.
//
// ============================================================================

use chrono::{DateTime, Utc};
use sea_orm::*;
use tracing::info;

use crate::errors::AppError;
use crate::models::recipe::{self, RecipeStatus};
use crate::services::access::{self, Actor};

#[derive(Debug, Clone, PartialEq)]
pub enum ModerationState {
    Pending,
    Approved {
        reviewed_by: i32,
        reviewed_at: DateTime<Utc>,
    },
    Rejected {
        reviewed_by: i32,
        reviewed_at: DateTime<Utc>,
        reason: String,
    },
}

impl ModerationState {
    /// Relit l'état depuis les colonnes de la recette
    pub fn from_recipe(recipe: &recipe::Model) -> Result<Self, AppError> {
        let inconsistent = || {
            AppError::Dependency(format!(
                "Recipe {} has inconsistent moderation columns",
                recipe.id
            ))
        };

        match recipe.status {
            RecipeStatus::Pending => Ok(ModerationState::Pending),
            RecipeStatus::Approved => Ok(ModerationState::Approved {
                reviewed_by: recipe.reviewed_by.ok_or_else(inconsistent)?,
                reviewed_at: recipe.reviewed_at.ok_or_else(inconsistent)?,
            }),
            RecipeStatus::Rejected => Ok(ModerationState::Rejected {
                reviewed_by: recipe.reviewed_by.ok_or_else(inconsistent)?,
                reviewed_at: recipe.reviewed_at.ok_or_else(inconsistent)?,
                reason: recipe.rejection_reason.clone().unwrap_or_default(),
            }),
        }
    }

    pub fn status(&self) -> RecipeStatus {
        match self {
            ModerationState::Pending => RecipeStatus::Pending,
            ModerationState::Approved { .. } => RecipeStatus::Approved,
            ModerationState::Rejected { .. } => RecipeStatus::Rejected,
        }
    }

    /// Une édition fait perdre toute décision précédente
    pub fn resubmit(self) -> Self {
        ModerationState::Pending
    }

    pub fn approve(self, admin_id: i32, now: DateTime<Utc>) -> Result<Self, AppError> {
        match self {
            ModerationState::Approved { .. } => Err(AppError::AlreadyApproved),
            ModerationState::Pending | ModerationState::Rejected { .. } => Ok(ModerationState::Approved {
                reviewed_by: admin_id,
                reviewed_at: now,
            }),
        }
    }

    pub fn reject(self, admin_id: i32, reason: &str, now: DateTime<Utc>) -> Result<Self, AppError> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("Rejection reason is required"));
        }

        match self {
            ModerationState::Rejected { .. } => Err(AppError::validation("Recipe is already rejected")),
            ModerationState::Pending | ModerationState::Approved { .. } => Ok(ModerationState::Rejected {
                reviewed_by: admin_id,
                reviewed_at: now,
                reason: reason.to_string(),
            }),
        }
    }

    /// Écrit les 4 colonnes de modération
    pub fn apply(&self, active: &mut recipe::ActiveModel) {
        active.status = Set(self.status());
        match self {
            ModerationState::Pending => {
                active.rejection_reason = Set(None);
                active.reviewed_by = Set(None);
                active.reviewed_at = Set(None);
            }
            ModerationState::Approved { reviewed_by, reviewed_at } => {
                active.rejection_reason = Set(None);
                active.reviewed_by = Set(Some(*reviewed_by));
                active.reviewed_at = Set(Some(*reviewed_at));
            }
            ModerationState::Rejected { reviewed_by, reviewed_at, reason } => {
                active.rejection_reason = Set(Some(reason.clone()));
                active.reviewed_by = Set(Some(*reviewed_by));
                active.reviewed_at = Set(Some(*reviewed_at));
            }
        }
    }
}

/// Décision d'un admin à appliquer
enum Decision<'a> {
    Approve,
    Reject(&'a str),
}

pub struct ModerationService;

impl ModerationService {
    pub async fn approve(
        db: &DatabaseConnection,
        actor: &Actor,
        recipe_id: i32,
    ) -> Result<recipe::Model, AppError> {
        Self::decide(db, actor, recipe_id, Decision::Approve).await
    }

    pub async fn reject(
        db: &DatabaseConnection,
        actor: &Actor,
        recipe_id: i32,
        reason: Option<&str>,
    ) -> Result<recipe::Model, AppError> {
        Self::decide(db, actor, recipe_id, Decision::Reject(reason.unwrap_or(""))).await
    }

    async fn decide(
        db: &DatabaseConnection,
        actor: &Actor,
        recipe_id: i32,
        decision: Decision<'_>,
    ) -> Result<recipe::Model, AppError> {
        access::ensure_admin(actor)?;

        let txn = db.begin().await?;

        // Verrou sur la ligne : deux admins ne décident pas en même temps
        let current = recipe::Entity::find_by_id(recipe_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("Recipe"))?;

        let now = Utc::now();
        let state = ModerationState::from_recipe(&current)?;
        let next = match decision {
            Decision::Approve => state.approve(actor.id, now)?,
            Decision::Reject(reason) => state.reject(actor.id, reason, now)?,
        };

        let mut active: recipe::ActiveModel = current.into();
        next.apply(&mut active);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            recipe_id,
            admin_id = actor.id,
            status = updated.status.as_str(),
            "Recipe moderated"
        );

        Ok(updated)
    }
}
