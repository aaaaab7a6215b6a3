//! Label-based lookup of statement headers.
//!
//! A label ("CycloneDX", "SLSA Provenance", ...) is mapped to its registry
//! prefix, and index groups whose key *contains* that prefix are searched in
//! arrival order. Nothing found is not an error: the caller gets the empty
//! [`StatementHeader`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::index::StatementIndex;
use crate::registry::{PredicateRegistry, PREDICATE_REGISTRY};
use crate::statement::StatementHeader;

/// Whether the subject name takes part in resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubjectMatching {
    /// First statement of the first matching group wins; the subject name
    /// is ignored.
    #[default]
    FirstMatch,
    /// Only statements with a subject named exactly like the query qualify.
    Strict,
}

/// Resolves `label` against the canonical registry.
pub fn resolve(
    index: &StatementIndex,
    label: &str,
    subject_name: &str,
    matching: SubjectMatching,
) -> StatementHeader {
    resolve_in(&PREDICATE_REGISTRY, index, label, subject_name, matching)
}

pub fn resolve_in(
    registry: &PredicateRegistry,
    index: &StatementIndex,
    label: &str,
    subject_name: &str,
    matching: SubjectMatching,
) -> StatementHeader {
    let Some(prefix) = registry.prefix_for_label(label) else {
        debug!(label, "label not in registry");
        return StatementHeader::default();
    };

    let mut candidates = index
        .groups()
        .iter()
        .filter(|g| g.predicate_type().contains(prefix))
        .flat_map(|g| g.statements());

    let hit = match matching {
        SubjectMatching::FirstMatch => candidates.next(),
        SubjectMatching::Strict => candidates.find(|s| s.has_subject(subject_name)),
    };

    match hit {
        Some(statement) => statement.header(),
        None => {
            debug!(label, prefix, subject = subject_name, "no indexed statement for label");
            StatementHeader::default()
        }
    }
}
