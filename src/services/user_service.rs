// ============================================================================
// COMPTES UTILISATEURS
// ============================================================================
//
// Inscription, connexion, profil, mot de passe, plus les opérations admin
// sur les comptes (liste, suppression en cascade, statistiques) et la
// création du compte admin au démarrage.
//
// Le rôle n'est jamais lu dans le payload d'inscription : un compte créé
// par l'API est toujours "user". Le seul chemin vers "admin" est AdminSeed.
//
// ============================================================================

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::*;
use tracing::{info, warn};

use crate::config::AdminSeed;
use crate::errors::AppError;
use crate::models::dto::{
    ChangePasswordRequest, LoginRequest, PlatformStats, RegisterRequest, UpdateProfileRequest, normalize_email,
};
use crate::models::recipe::{self, RecipeSource, RecipeStatus};
use crate::models::users::{self, Role};
use crate::models::{favorite, review};
use crate::services::access::{self, Actor};
use crate::services::rating_service::RatingService;
use crate::utils::password;

pub struct UserService;

impl UserService {
    /// Payload déjà normalisé et validé par la route
    pub async fn register(db: &DatabaseConnection, request: RegisterRequest) -> Result<users::Model, AppError> {
        // Pré-vérification pour un message précis, l'index unique reste le garde-fou
        if find_by_email(db, &request.email).await?.is_some() {
            return Err(AppError::Duplicate("Email already registered".to_string()));
        }
        if find_by_pseudo(db, &request.pseudo).await?.is_some() {
            return Err(AppError::Duplicate("Pseudo already taken".to_string()));
        }

        let user = Self::insert(db, &request.name, &request.lastname, &request.pseudo, &request.email, &request.password, Role::User).await?;
        info!(user_id = user.id, pseudo = %user.pseudo, "User registered");

        Ok(user)
    }

    /// Email inconnu et mauvais mot de passe donnent la même erreur
    pub async fn login(db: &DatabaseConnection, request: &LoginRequest) -> Result<users::Model, AppError> {
        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = find_by_email(db, &normalize_email(&request.email))
            .await?
            .ok_or_else(invalid)?;

        if !password::verify_password(&request.password, &user.password_hash)? {
            return Err(invalid());
        }

        if !user.is_active {
            return Err(AppError::forbidden("Account is deactivated"));
        }

        Ok(user)
    }

    pub async fn profile(db: &DatabaseConnection, actor: &Actor) -> Result<users::Model, AppError> {
        users::Entity::find_by_id(actor.id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn update_profile(
        db: &DatabaseConnection,
        actor: &Actor,
        request: UpdateProfileRequest,
    ) -> Result<users::Model, AppError> {
        let current = Self::profile(db, actor).await?;

        if let Some(pseudo) = request.pseudo.as_deref().map(str::trim) {
            if pseudo != current.pseudo {
                if let Some(other) = find_by_pseudo(db, pseudo).await? {
                    if other.id != current.id {
                        return Err(AppError::Duplicate("Pseudo already taken".to_string()));
                    }
                }
            }
        }

        let mut active: users::ActiveModel = current.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(lastname) = request.lastname {
            active.lastname = Set(lastname.trim().to_string());
        }
        if let Some(pseudo) = request.pseudo {
            active.pseudo = Set(pseudo.trim().to_string());
        }
        if let Some(picture) = request.profile_picture {
            active.profile_picture = Set(picture);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await?;
        info!(user_id = updated.id, "Profile updated");

        Ok(updated)
    }

    pub async fn change_password(
        db: &DatabaseConnection,
        actor: &Actor,
        request: &ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let user = Self::profile(db, actor).await?;

        if !password::verify_password(&request.current_password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Current password is incorrect".to_string()));
        }

        let new_hash = password::hash_password(&request.new_password)?;
        let mut active: users::ActiveModel = user.into();
        active.password_hash = Set(new_hash);
        active.updated_at = Set(Utc::now());
        active.update(db).await?;

        info!(user_id = actor.id, "Password changed");
        Ok(())
    }

    /// Tous les comptes, plus récents d'abord (le hash n'est jamais sérialisé)
    pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<users::Model>, AppError> {
        let users = users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .order_by_desc(users::Column::Id)
            .all(db)
            .await?;

        Ok(users)
    }

    /// Supprime un compte non-admin avec ses recettes (et leurs avis/favoris),
    /// ses avis et ses favoris. Les notes des recettes des autres qu'il avait
    /// notées sont recalculées après le commit.
    pub async fn delete_user(db: &DatabaseConnection, actor: &Actor, user_id: i32) -> Result<(), AppError> {
        access::ensure_admin(actor)?;

        let txn = db.begin().await?;

        let target = users::Entity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;
        access::ensure_user_deletable(&target)?;

        let owned_recipes: Vec<i32> = recipe::Entity::find()
            .filter(recipe::Column::RequestedBy.eq(user_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();

        // Recettes d'autres utilisateurs touchées par ses avis
        let reviewed: BTreeSet<i32> = review::Entity::find()
            .filter(review::Column::UserId.eq(user_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|r| r.recipe_id)
            .filter(|recipe_id| !owned_recipes.contains(recipe_id))
            .collect();

        if !owned_recipes.is_empty() {
            review::Entity::delete_many()
                .filter(review::Column::RecipeId.is_in(owned_recipes.clone()))
                .exec(&txn)
                .await?;
            favorite::Entity::delete_many()
                .filter(favorite::Column::RecipeId.is_in(owned_recipes.clone()))
                .exec(&txn)
                .await?;
            recipe::Entity::delete_many()
                .filter(recipe::Column::Id.is_in(owned_recipes.clone()))
                .exec(&txn)
                .await?;
        }

        let reviews = review::Entity::delete_many()
            .filter(review::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        let favorites = favorite::Entity::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;
        users::Entity::delete_by_id(user_id).exec(&txn).await?;

        txn.commit().await?;

        info!(
            user_id,
            admin_id = actor.id,
            recipes_deleted = owned_recipes.len(),
            reviews_deleted = reviews.rows_affected,
            favorites_deleted = favorites.rows_affected,
            "User deleted"
        );

        for recipe_id in reviewed {
            RatingService::recompute_after_mutation(db, recipe_id).await;
        }

        Ok(())
    }

    pub async fn stats(db: &DatabaseConnection) -> Result<PlatformStats, AppError> {
        let count_status = |status: RecipeStatus| {
            recipe::Entity::find()
                .filter(recipe::Column::Status.eq(status))
                .count(db)
        };
        let count_source = |source: RecipeSource| {
            recipe::Entity::find()
                .filter(recipe::Column::Source.eq(source))
                .count(db)
        };

        Ok(PlatformStats {
            total_users: users::Entity::find().count(db).await?,
            total_recipes: recipe::Entity::find().count(db).await?,
            approved_recipes: count_status(RecipeStatus::Approved).await?,
            pending_recipes: count_status(RecipeStatus::Pending).await?,
            rejected_recipes: count_status(RecipeStatus::Rejected).await?,
            total_favorites: favorite::Entity::find().count(db).await?,
            total_reviews: review::Entity::find().count(db).await?,
            ai_recipes: count_source(RecipeSource::Ai).await?,
            human_recipes: count_source(RecipeSource::Human).await?,
        })
    }

    /// Crée le compte admin configuré s'il n'existe pas encore.
    /// Un compte existant avec cet email n'est pas modifié.
    pub async fn ensure_admin(db: &DatabaseConnection, seed: &AdminSeed) -> Result<Option<users::Model>, AppError> {
        let email = normalize_email(&seed.email);

        if let Some(existing) = find_by_email(db, &email).await? {
            if existing.role != Role::Admin {
                warn!(user_id = existing.id, "ADMIN_EMAIL belongs to a non-admin account, leaving it untouched");
            }
            return Ok(None);
        }

        let admin = Self::insert(db, "Admin", "Admin", seed.pseudo.trim(), &email, &seed.password, Role::Admin).await?;
        info!(user_id = admin.id, email = %admin.email, "Admin account created");

        Ok(Some(admin))
    }

    async fn insert(
        db: &DatabaseConnection,
        name: &str,
        lastname: &str,
        pseudo: &str,
        email: &str,
        plain_password: &str,
        role: Role,
    ) -> Result<users::Model, AppError> {
        let now = Utc::now();
        let user = users::ActiveModel {
            name: Set(name.to_string()),
            lastname: Set(lastname.to_string()),
            pseudo: Set(pseudo.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password::hash_password(plain_password)?),
            role: Set(role),
            profile_picture: Set(String::new()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        Ok(user)
    }
}

async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<users::Model>, AppError> {
    Ok(users::Entity::find()
        .filter(users::Column::Email.eq(email))
        .one(db)
        .await?)
}

async fn find_by_pseudo(db: &DatabaseConnection, pseudo: &str) -> Result<Option<users::Model>, AppError> {
    Ok(users::Entity::find()
        .filter(users::Column::Pseudo.eq(pseudo))
        .one(db)
        .await?)
}
