//! Error types for evaluator construction.

use crate::record::{DataType, Value};
use thiserror::Error;

/// Errors raised while turning a field specification into an evaluator.
///
/// Every variant describes a malformed specification: retrying the same
/// request cannot succeed, and no records are examined before one is raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Field not found: {record} has no field named '{field}'")]
    FieldNotFound { record: &'static str, field: String },

    #[error("Cannot coerce {value:?} to {target} for field '{field}'")]
    Coercion {
        field: String,
        value: Value,
        target: DataType,
    },

    #[error("Grouping requires at least one field")]
    EmptyFieldList,
}

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
