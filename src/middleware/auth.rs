use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::users::Role;
use crate::services::access::Actor;
use crate::utils::jwt;

/// Identité déjà vérifiée portée par le bearer token { id, role }
/// Utilisée comme extracteur dans les routes protégées.
/// `Option<AuthUser>` pour les routes publiques qui s'adaptent à l'appelant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: Role,
}

impl AuthUser {
    /// Passe l'identité explicitement aux services
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user_id,
            role: self.role,
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

fn extract(req: &HttpRequest) -> Result<AuthUser, AppError> {
    // 1. Extraire le header Authorization
    let auth_header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

    // 2. Convertir le header en string
    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".to_string()))?;

    // 3. Extraire le token (format: "Bearer <token>")
    let token = auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

    // 4. Vérifier le token JWT
    let config = req
        .app_data::<web::Data<AppConfig>>()
        .ok_or_else(|| AppError::Dependency("Application config is not registered".to_string()))?;
    let claims = jwt::verify_token(config, token)?;

    // 5. Le rôle doit être connu
    let role = Role::parse(&claims.role)
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    Ok(AuthUser {
        user_id: claims.sub,
        role,
    })
}
