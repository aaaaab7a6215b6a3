//! Statement index builder.
//!
//! A batch (usually one `.jsonl` file) is streamed line by line through
//! [`decode_statement`] and [`validate_statement`]. Accepted statements are
//! grouped by their literal `predicateType`; groups keep first-arrival order
//! and statements keep arrival order within a group.
//!
//! The default [`BatchMode::FailFast`] is all-or-nothing: the first bad line
//! fails the batch and no partial index escapes. [`BatchMode::CollectErrors`]
//! is the opt-in alternative that records every bad line and indexes the
//! rest.

use std::collections::HashMap;
use std::io::BufRead;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::statement::{decode_statement, DecodeError, Statement};
use crate::validate::{validate_statement, ValidationError};

/// What went wrong with a single line.
#[derive(Debug, Error)]
pub enum LineError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A batch could not be indexed.
#[derive(Debug, Error)]
pub enum BatchError {
    /// `line` is 1-based.
    #[error("line {line}: {source}")]
    Line {
        line: usize,
        #[source]
        source: LineError,
    },
    #[error("reading input: {0}")]
    Io(#[from] std::io::Error),
}

impl BatchError {
    /// The 1-based line that failed, if the failure was line content.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Line { line, .. } => Some(*line),
            Self::Io(_) => None,
        }
    }
}

/// How the builder reacts to a bad line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchMode {
    /// Abort the batch on the first bad line.
    #[default]
    FailFast,
    /// Index every good line and report every bad one.
    CollectErrors,
}

/// Statements sharing one literal `predicateType`.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateGroup {
    predicate_type: String,
    statements: Vec<Statement>,
}

impl PredicateGroup {
    pub fn predicate_type(&self) -> &str {
        &self.predicate_type
    }

    /// In arrival order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

/// Accepted statements of one batch, grouped by `predicateType`.
///
/// Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementIndex {
    groups: Vec<PredicateGroup>,
    positions: HashMap<String, usize>,
}

impl StatementIndex {
    fn insert(&mut self, statement: Statement) {
        if let Some(group) = self
            .positions
            .get(&statement.predicate_type)
            .and_then(|&pos| self.groups.get_mut(pos))
        {
            group.statements.push(statement);
            return;
        }
        self.positions
            .insert(statement.predicate_type.clone(), self.groups.len());
        self.groups.push(PredicateGroup {
            predicate_type: statement.predicate_type.clone(),
            statements: vec![statement],
        });
    }

    /// Statements whose `predicateType` is exactly `predicate_type`.
    pub fn get(&self, predicate_type: &str) -> Option<&[Statement]> {
        self.positions
            .get(predicate_type)
            .and_then(|&pos| self.groups.get(pos))
            .map(PredicateGroup::statements)
    }

    /// Groups in order of first arrival.
    pub fn groups(&self) -> &[PredicateGroup] {
        &self.groups
    }

    pub fn predicate_types(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(PredicateGroup::predicate_type)
    }

    /// Number of distinct predicate types.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total statements across all groups.
    pub fn statement_count(&self) -> usize {
        self.groups.iter().map(|g| g.statements.len()).sum()
    }
}

/// A line rejected in [`BatchMode::CollectErrors`].
#[derive(Debug)]
pub struct RejectedLine {
    pub line: usize,
    pub error: LineError,
}

/// Result of a successful build. `rejected` is always empty in fail-fast mode.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub index: StatementIndex,
    pub rejected: Vec<RejectedLine>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct IndexBuilder {
    mode: BatchMode,
    skip_blank_lines: bool,
}

impl IndexBuilder {
    pub fn new(mode: BatchMode) -> Self {
        Self {
            mode,
            skip_blank_lines: false,
        }
    }

    /// Skip whitespace-only lines instead of rejecting them as malformed.
    #[must_use]
    pub fn skip_blank_lines(mut self, skip: bool) -> Self {
        self.skip_blank_lines = skip;
        self
    }

    pub fn mode(&self) -> BatchMode {
        self.mode
    }

    pub fn build(&self, input: &[u8]) -> Result<BatchOutcome, BatchError> {
        self.build_from_reader(input)
    }

    pub fn build_from_reader<R: BufRead>(&self, reader: R) -> Result<BatchOutcome, BatchError> {
        let mut outcome = BatchOutcome::default();

        for (idx, raw) in reader.split(b'\n').enumerate() {
            let line_no = idx + 1;
            let mut raw = raw?;
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            if self.skip_blank_lines && raw.iter().all(u8::is_ascii_whitespace) {
                debug!(line = line_no, "skipping blank line");
                continue;
            }

            match check_line(&raw) {
                Ok(statement) => {
                    debug!(
                        line = line_no,
                        predicate_type = %statement.predicate_type,
                        "accepted statement"
                    );
                    outcome.index.insert(statement);
                }
                Err(error) => {
                    warn!(line = line_no, %error, "rejected statement");
                    match self.mode {
                        BatchMode::FailFast => {
                            return Err(BatchError::Line {
                                line: line_no,
                                source: error,
                            })
                        }
                        BatchMode::CollectErrors => outcome.rejected.push(RejectedLine {
                            line: line_no,
                            error,
                        }),
                    }
                }
            }
        }

        Ok(outcome)
    }
}

fn check_line(raw: &[u8]) -> Result<Statement, LineError> {
    let statement = decode_statement(raw)?;
    validate_statement(&statement)?;
    Ok(statement)
}

/// Builds an index with the strict all-or-nothing contract.
pub fn build_index(input: &[u8]) -> Result<StatementIndex, BatchError> {
    IndexBuilder::default().build(input).map(|o| o.index)
}
