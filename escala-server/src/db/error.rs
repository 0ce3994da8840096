//! Storage error type

/// Database error type
///
/// Constraint violations are classified so services can turn them into
/// 409/404 responses without checking before writing.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(sqlx::Error),

    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },
}

impl DbError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(self, Self::ForeignKeyViolation { .. })
    }
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            let constraint = db.constraint().unwrap_or_default().to_owned();
            if db.is_unique_violation() {
                return Self::UniqueViolation { constraint };
            }
            if db.is_foreign_key_violation() {
                return Self::ForeignKeyViolation { constraint };
            }
        }
        Self::Sqlx(e)
    }
}
