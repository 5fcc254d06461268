//! Shared utilities for feature modules

pub mod validation;

pub use validation::{parse_record_id, RecordIdError};
