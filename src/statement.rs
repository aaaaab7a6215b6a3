//! in-toto Statement v1 data model and the single-line decoder.
//!
//! See: <https://github.com/in-toto/attestation/blob/main/spec/v1/statement.md>
//!
//! Decoding is deliberately lenient about *missing* fields: an absent or
//! `null` field decodes to its empty value so that the validator, not the
//! decoder, reports it with a precise reason. A field of the wrong JSON type
//! is still a decode error.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// The statement type identifier every accepted statement must carry.
pub const STATEMENT_TYPE_V1: &str = "https://in-toto.io/Statement/v1";

/// A line could not be decoded into a [`Statement`].
#[derive(Debug, Error)]
#[error("invalid JSON: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// One attestation record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "_type", default, deserialize_with = "null_as_default")]
    pub statement_type: String,
    #[serde(rename = "predicateType", default, deserialize_with = "null_as_default")]
    pub predicate_type: String,
    #[serde(rename = "subject", default, deserialize_with = "null_as_default")]
    pub subjects: Vec<Subject>,
    /// Opaque payload. Never interpreted here.
    #[serde(default)]
    pub predicate: serde_json::Value,
}

/// An artifact the statement makes claims about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Algorithm name to hex digest, e.g. `sha256`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub digest: BTreeMap<String, String>,
}

/// The envelope-level fields of a statement, returned by the resolver.
///
/// The `Default` value is the "absent" header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementHeader {
    #[serde(rename = "_type")]
    pub statement_type: String,
    #[serde(rename = "predicateType")]
    pub predicate_type: String,
}

impl StatementHeader {
    /// True for the absent header produced when nothing matched.
    pub fn is_empty(&self) -> bool {
        self.statement_type.is_empty() && self.predicate_type.is_empty()
    }
}

impl Statement {
    pub fn header(&self) -> StatementHeader {
        StatementHeader {
            statement_type: self.statement_type.clone(),
            predicate_type: self.predicate_type.clone(),
        }
    }

    /// True if any subject is named exactly `name`.
    pub fn has_subject(&self, name: &str) -> bool {
        self.subjects.iter().any(|s| s.name == name)
    }
}

/// Decodes one line of input. Blank lines are malformed like any other
/// non-JSON input. A bare `null` decodes to the empty statement.
pub fn decode_statement(line: &[u8]) -> Result<Statement, DecodeError> {
    let statement: Option<Statement> = serde_json::from_slice(line)?;
    Ok(statement.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
