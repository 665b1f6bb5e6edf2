// ============================================================================
// ERREURS APPLICATIVES
// ============================================================================
//
// Description:
//   Taxonomie d'erreurs commune à tous les services. Chaque variante a un
//   identifiant stable (kind) et se traduit en statut HTTP + enveloppe JSON
//   { success: false, message, kind }.
//
// ============================================================================

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Duplicate(String),

    #[error("Recipe is already approved")]
    AlreadyApproved,

    /// Base de données, Gemini, Pexels, système de fichiers...
    #[error("{0}")]
    Dependency(String),

    /// Le générateur IA a répondu quelque chose d'inexploitable
    #[error("{0}")]
    Upstream(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Duplicate(_) => "duplicate_entry",
            AppError::AlreadyApproved => "already_approved",
            AppError::Dependency(_) | AppError::Upstream(_) => "dependency_failure",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return AppError::Duplicate(duplicate_message(&detail));
        }

        match err {
            DbErr::RecordNotFound(what) => AppError::NotFound(what),
            other => AppError::Dependency(format!("Database error: {}", other)),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(flatten_validation_errors(&errors))
    }
}

/// Traduit le nom de la contrainte en message lisible
fn duplicate_message(detail: &str) -> String {
    let detail = detail.to_lowercase();
    if detail.contains("review") {
        "You already reviewed this recipe".to_string()
    } else if detail.contains("favorite") {
        "Recipe already in favorites".to_string()
    } else if detail.contains("email") {
        "Email already registered".to_string()
    } else if detail.contains("pseudo") {
        "Pseudo already taken".to_string()
    } else {
        "Duplicate entry".to_string()
    }
}

/// "field: message; field: message" trié par nom de champ, listes et
/// structures imbriquées comprises (ingredients[0].name: ...)
pub fn flatten_validation_errors(errors: &ValidationErrors) -> String {
    let mut parts = Vec::new();
    collect_validation_errors(errors, "", &mut parts);
    parts.sort();

    if parts.is_empty() {
        "Validation error".to_string()
    } else {
        parts.join("; ")
    }
}

fn collect_validation_errors(errors: &ValidationErrors, prefix: &str, parts: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };

        match kind {
            ValidationErrorsKind::Field(errs) => {
                let detail = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                parts.push(format!("{}: {}", path, detail));
            }
            ValidationErrorsKind::Struct(inner) => collect_validation_errors(inner, &path, parts),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_validation_errors(inner, &format!("{}[{}]", path, index), parts);
                }
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    message: String,
    kind: &'a str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::AlreadyApproved => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            success: false,
            message: self.to_string(),
            kind: self.kind(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(min = 10, message = "Comment must be at least 10 characters"))]
        comment: String,
        #[validate(range(min = 1, max = 5))]
        rating: i32,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::validation("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AlreadyApproved.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("Recipe").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::forbidden("no").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Duplicate("dup".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Unauthorized("no".into()).status_code(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_kinds_are_stable() {
        assert_eq!(AppError::AlreadyApproved.kind(), "already_approved");
        assert_eq!(AppError::Duplicate("x".into()).kind(), "duplicate_entry");
        assert_eq!(AppError::Upstream("x".into()).kind(), "dependency_failure");
    }

    #[test]
    fn test_validation_errors_are_flattened() {
        let probe = Probe { comment: "short".to_string(), rating: 9 };
        let err: AppError = probe.validate().unwrap_err().into();

        match err {
            AppError::Validation(message) => {
                assert!(message.starts_with("comment: Comment must be at least 10 characters"));
                assert!(message.contains("rating: range"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_record_not_found_maps_to_not_found() {
        let err: AppError = DbErr::RecordNotFound("Recipe not found".to_string()).into();
        assert_eq!(err.kind(), "not_found");
    }
}
