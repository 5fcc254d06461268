//! Shared validation utilities
//!
//! Path-parameter parsing used by every route that addresses a record
//! by id.

use thiserror::Error;

/// Errors that can occur when parsing a record id from a path parameter
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordIdError {
    #[error("Invalid summary id '{0}': must be a non-negative integer")]
    Invalid(String),
}

/// Parse a path parameter as a record identifier
///
/// Accepts non-negative integers that fit the store's id column.
pub fn parse_record_id(raw: &str) -> Result<i32, RecordIdError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id >= 0)
        .ok_or_else(|| RecordIdError::Invalid(raw.to_string()))
}
