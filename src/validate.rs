//! Structural and vocabulary checks for a single decoded statement.
//!
//! Rules run in a fixed order and the first failure wins:
//!
//! 1. `_type` contains [`STATEMENT_TYPE_V1`]
//! 2. `predicateType` is non-empty
//! 3. `predicateType` contains a registered prefix
//! 4. at least one subject
//! 5. every subject has a name

use thiserror::Error;

use crate::registry::PREDICATE_REGISTRY;
use crate::statement::{Statement, STATEMENT_TYPE_V1};

/// Why a statement was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid _type: {0:?}")]
    InvalidType(String),

    #[error("predicateType is empty")]
    EmptyPredicateType,

    #[error("predicateType {0:?} is not a recognized predicate")]
    UnrecognizedPredicateType(String),

    #[error("subject is empty")]
    EmptySubject,

    /// Zero-based position of the offending subject.
    #[error("subject name is empty (subject #{0})")]
    EmptySubjectName(usize),
}

pub fn validate_statement(statement: &Statement) -> Result<(), ValidationError> {
    if !statement.statement_type.contains(STATEMENT_TYPE_V1) {
        return Err(ValidationError::InvalidType(
            statement.statement_type.clone(),
        ));
    }

    if statement.predicate_type.is_empty() {
        return Err(ValidationError::EmptyPredicateType);
    }

    if !PREDICATE_REGISTRY.is_recognized(&statement.predicate_type) {
        return Err(ValidationError::UnrecognizedPredicateType(
            statement.predicate_type.clone(),
        ));
    }

    if statement.subjects.is_empty() {
        return Err(ValidationError::EmptySubject);
    }

    if let Some(pos) = statement.subjects.iter().position(|s| s.name.is_empty()) {
        return Err(ValidationError::EmptySubjectName(pos));
    }

    Ok(())
}
