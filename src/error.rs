// Catalog errors
// One error type for the library; the CLI wraps it in anyhow

use rusqlite::ffi;
use thiserror::Error;

use crate::validation::ValidationError;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// One or more fields failed their constraints. Nothing was written.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// A product path was requested but the product has no category.
    #[error("product has no category")]
    MissingCategory,

    /// The operation needs an entity that has been stored (has an id).
    #[error("{0} has not been saved yet")]
    NotPersisted(&'static str),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A category or tag id that does not exist in storage.
    #[error("related record not found")]
    InvalidReference,

    #[error("storage error: {0}")]
    Storage(#[source] rusqlite::Error),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Self::InvalidReference
            }
            _ => Self::Storage(error),
        }
    }
}

impl From<Vec<ValidationError>> for CatalogError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

impl CatalogError {
    /// Field names rejected by validation, empty for every other variant.
    pub fn invalid_fields(&self) -> Vec<&str> {
        match self {
            Self::Validation(errors) => errors.iter().map(|e| e.field.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_field() {
        let error = CatalogError::from(vec![
            ValidationError::new("Product", "title", "Required field is empty"),
            ValidationError::new("Product", "discount", "Must be between 0 and 100, got 120"),
        ]);

        let message = error.to_string();
        assert!(message.contains("title"));
        assert!(message.contains("discount"));
        assert_eq!(error.invalid_fields(), vec!["title", "discount"]);
    }

    #[test]
    fn test_foreign_key_failure_maps_to_invalid_reference() {
        let failure = rusqlite::Error::SqliteFailure(
            ffi::Error {
                code: ffi::ErrorCode::ConstraintViolation,
                extended_code: ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            },
            None,
        );

        assert!(matches!(
            CatalogError::from(failure),
            CatalogError::InvalidReference
        ));
    }

    #[test]
    fn test_other_sqlite_failures_pass_through() {
        let error = CatalogError::from(rusqlite::Error::QueryReturnedNoRows);

        assert!(matches!(
            error,
            CatalogError::Storage(rusqlite::Error::QueryReturnedNoRows)
        ));
        assert!(error.invalid_fields().is_empty());
    }
}
