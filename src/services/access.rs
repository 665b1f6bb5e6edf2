// ============================================================================
// CONTRÔLE D'ACCÈS
// ============================================================================
//
// Deux prédicats indépendants :
//   - is_owner(actor, resource) : actor.id == champ propriétaire
//     (requested_by pour Recipe, user_id pour Review / Favorite)
//   - is_admin(actor)           : actor.role == admin
//
// Règles :
//   - créer            : authentifié (l'acteur devient propriétaire)
//   - modifier         : propriétaire uniquement, même pas l'admin
//   - supprimer        : propriétaire OU admin
//   - approuver/rejeter: admin
//   - supprimer un user: jamais si la cible est admin
//   - voir une recette : approuvée, sinon propriétaire OU admin
//
// L'acteur est toujours passé en paramètre, jamais lu dans la requête.
//
// ============================================================================

use sea_orm::{DatabaseConnection, EntityTrait};

use crate::errors::AppError;
use crate::models::users::{self, Role};
use crate::models::{favorite, recipe, review};

/// Identité { id, role } déjà vérifiée par le credential verifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub role: Role,
}

/// Ressource qui appartient à un utilisateur
pub trait Owned {
    fn owner_id(&self) -> i32;
}

impl Owned for recipe::Model {
    fn owner_id(&self) -> i32 {
        self.requested_by
    }
}

impl Owned for review::Model {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

impl Owned for favorite::Model {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

pub fn is_owner<R: Owned>(actor: &Actor, resource: &R) -> bool {
    actor.id == resource.owner_id()
}

pub fn is_admin(actor: &Actor) -> bool {
    actor.role == Role::Admin
}

/// Une recette non visible doit répondre NotFound, pas Forbidden
pub fn can_view_recipe(viewer: Option<&Actor>, recipe: &recipe::Model) -> bool {
    recipe.status == recipe::RecipeStatus::Approved
        || viewer.is_some_and(|actor| is_owner(actor, recipe) || is_admin(actor))
}

pub fn ensure_can_update<R: Owned>(actor: &Actor, resource: &R) -> Result<(), AppError> {
    if is_owner(actor, resource) {
        Ok(())
    } else {
        Err(AppError::forbidden("Access denied: only the owner can edit this resource"))
    }
}

pub fn ensure_can_delete<R: Owned>(actor: &Actor, resource: &R) -> Result<(), AppError> {
    if is_owner(actor, resource) || is_admin(actor) {
        Ok(())
    } else {
        Err(AppError::forbidden("Access denied: only the owner or an admin can delete this resource"))
    }
}

pub fn ensure_admin(actor: &Actor) -> Result<(), AppError> {
    if is_admin(actor) {
        Ok(())
    } else {
        Err(AppError::forbidden("Access denied. Admin only."))
    }
}

/// Les comptes admin sont protégés, peu importe qui demande
pub fn ensure_user_deletable(target: &users::Model) -> Result<(), AppError> {
    if target.role == Role::Admin {
        Err(AppError::forbidden("Cannot delete admin users"))
    } else {
        Ok(())
    }
}

/// Admin + compte toujours présent en base avec le rôle admin.
/// Un token encore valide d'un compte supprimé ou rétrogradé est refusé.
pub async fn require_admin_account(
    db: &DatabaseConnection,
    actor: &Actor,
) -> Result<users::Model, AppError> {
    ensure_admin(actor)?;

    let account = users::Entity::find_by_id(actor.id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    if account.role != Role::Admin {
        return Err(AppError::forbidden("Access denied. Admin only."));
    }

    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(i32);

    impl Owned for Thing {
        fn owner_id(&self) -> i32 {
            self.0
        }
    }

    const OWNER: Actor = Actor { id: 1, role: Role::User };
    const STRANGER: Actor = Actor { id: 2, role: Role::User };
    const ADMIN: Actor = Actor { id: 3, role: Role::Admin };

    #[test]
    fn test_owner_predicate() {
        assert!(is_owner(&OWNER, &Thing(1)));
        assert!(!is_owner(&STRANGER, &Thing(1)));
        assert!(!is_owner(&ADMIN, &Thing(1)));
    }

    #[test]
    fn test_admin_cannot_edit_someone_else() {
        assert!(ensure_can_update(&OWNER, &Thing(1)).is_ok());
        assert!(matches!(ensure_can_update(&ADMIN, &Thing(1)), Err(AppError::Forbidden(_))));
        assert!(matches!(ensure_can_update(&STRANGER, &Thing(1)), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_delete_owner_or_admin() {
        assert!(ensure_can_delete(&OWNER, &Thing(1)).is_ok());
        assert!(ensure_can_delete(&ADMIN, &Thing(1)).is_ok());
        assert!(matches!(ensure_can_delete(&STRANGER, &Thing(1)), Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_admin_only() {
        assert!(ensure_admin(&ADMIN).is_ok());
        assert!(matches!(ensure_admin(&OWNER), Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_account_must_still_exist() {
        let db = crate::db::test_connection().await;
        let ghost = Actor { id: 999, role: Role::Admin };

        let result = require_admin_account(&db, &ghost).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
