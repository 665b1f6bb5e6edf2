// ============================================================================
// CONFIGURATION
// ============================================================================
//
// Description:
//   Toutes les variables d'environnement lues au démarrage (après dotenv).
//   La config est ensuite partagée via web::Data<AppConfig>, les handlers
//   ne relisent jamais l'environnement eux-mêmes.
//
// Variables:
//   - DATABASE_URL (obligatoire)
//   - JWT_SECRET, JWT_TTL_HOURS
//   - HOST, PORT
//   - UPLOAD_DIR
//   - GEMINI_API_KEY, GEMINI_MODEL, PEXELS_API_KEY
//   - ADMIN_EMAIL, ADMIN_PASSWORD, ADMIN_PSEUDO
//   - AUTO_MIGRATE
//
// ============================================================================

use std::env;
use thiserror::Error;
use tracing::warn;

const DEFAULT_JWT_SECRET: &str = "default-insecure-key-change-this";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in .env file")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Identifiants du compte admin créé au démarrage
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub pseudo: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub host: String,
    pub port: u16,
    pub upload_dir: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub pexels_api_key: Option<String>,
    pub admin_seed: Option<AdminSeed>,
    pub auto_migrate: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = match optional("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                warn!("JWT_SECRET not found in .env, using default (INSECURE)");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        let admin_seed = match (optional("ADMIN_EMAIL"), optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed {
                email,
                password,
                pseudo: optional("ADMIN_PSEUDO").unwrap_or_else(|| "admin".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 24)?,
            host: optional("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or("PORT", 8080)?,
            upload_dir: optional("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
            gemini_api_key: optional("GEMINI_API_KEY"),
            gemini_model: optional("GEMINI_MODEL").unwrap_or_else(|| "gemini-2.5-flash".to_string()),
            pexels_api_key: optional("PEXELS_API_KEY"),
            admin_seed,
            auto_migrate: parse_or("AUTO_MIGRATE", true)?,
        })
    }

    /// Config minimale pour les tests (pas de clés externes)
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            jwt_secret: "test-secret".to_string(),
            jwt_ttl_hours: 1,
            host: "127.0.0.1".to_string(),
            port: 0,
            upload_dir: std::env::temp_dir().join("fridge-api-uploads").to_string_lossy().into_owned(),
            gemini_api_key: None,
            gemini_model: "gemini-2.5-flash".to_string(),
            pexels_api_key: None,
            admin_seed: None,
            auto_migrate: true,
        }
    }
}

/// Une variable vide est traitée comme absente
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}
