//! Classified service errors
//!
//! Every failure a service reports is an [`AppError`]: a kind that fixes
//! the HTTP status, a human-readable message and optional sub-messages.

use thiserror::Error;

use crate::db::DbError;
use crate::models::ValidationError;

/// Generic client-facing text for unclassified failures
pub const UNEXPECTED_MESSAGE: &str = "Erro interno do servidor";

/// Client-facing text for a unique violation no service mapped
pub const DUPLICATE_MESSAGE: &str = "Registro já existe";

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed input (400)
    Validation,
    /// Referenced id does not exist (404)
    NotFound,
    /// Uniqueness violation (409)
    Conflict,
    /// Anything else (500)
    Unexpected,
}

impl ErrorKind {
    pub fn status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Unexpected => 500,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    details: Vec<String>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Unclassified failure. The message is for logs only; clients get
    /// [`UNEXPECTED_MESSAGE`].
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Map a store error, turning a unique-index violation into a 409 with
    /// the entity-specific `conflict` text.
    pub fn from_db(err: DbError, conflict: &str) -> Self {
        match err {
            DbError::UniqueViolation { .. } => Self::conflict(conflict),
            other => other.into(),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::validation(e.to_string())
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::UniqueViolation { constraint } => {
                tracing::warn!(%constraint, "unmapped unique violation");
                Self::conflict(DUPLICATE_MESSAGE)
            }
            other => Self::unexpected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_status_codes() {
        assert_eq!(AppError::validation("x").status(), 400);
        assert_eq!(AppError::not_found("x").status(), 404);
        assert_eq!(AppError::conflict("x").status(), 409);
        assert_eq!(AppError::unexpected("x").status(), 500);
    }

    #[test]
    fn unique_violation_uses_entity_text() {
        let err = AppError::from_db(
            DbError::UniqueViolation {
                constraint: "categorias_nome_key".into(),
            },
            "Já existe uma categoria com esse nome",
        );
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.message(), "Já existe uma categoria com esse nome");
    }

    #[test]
    fn unmapped_unique_violation_hides_constraint() {
        let err: AppError = DbError::UniqueViolation {
            constraint: "integrantes_cpf_key".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.message(), DUPLICATE_MESSAGE);
        assert!(!err.message().contains("integrantes"));
    }

    #[test]
    fn foreign_key_violation_is_unexpected_by_default() {
        let err: AppError = DbError::ForeignKeyViolation {
            constraint: "versoes_artista_id_fkey".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn validation_error_converts_to_400() {
        let err: AppError = ValidationError::Empty { field: "CPF" }.into();
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "CPF é obrigatório");
    }
}
