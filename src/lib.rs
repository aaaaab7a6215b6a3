//! # intoto-scan
//!
//! Validates newline-delimited in-toto attestation statements and indexes the
//! accepted ones by predicate type.
//!
//! A batch (one `.jsonl` file) is trusted all-or-nothing: the first line that
//! fails to decode or breaks the statement contract rejects the whole batch.
//! Accepted statements are grouped by their literal `predicateType`, and a
//! statement header can then be looked up by a human label such as
//! `"CycloneDX"` or `"SLSA Provenance"`.
//!
//! Signature verification of envelopes is out of scope.
//!
//! ## Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`statement`] | Statement model and line decoder |
//! | [`validate`] | Structural and vocabulary checks |
//! | [`registry`] | Recognized predicate prefixes and labels |
//! | [`index`] | Batch index builder |
//! | [`resolve`] | Label to statement header lookup |
//! | [`policy`] | Scan configuration and defaults |
//! | [`fs_guard`] | Symlink-safe, size-bounded file reads |
//! | [`inputs`] | Batch file discovery |
//! | [`report`] | JSON run report |

#![forbid(unsafe_code)]

pub mod statement;

pub mod validate;

/// Static table of predicate-type prefixes and their labels.
pub mod registry;

pub mod index;

pub mod resolve;

/// Scan policy: loads `intoto-scan-policy.json` and provides strict defaults.
pub mod policy;

/// Symlink-safe, size-bounded file reads for every untrusted input.
pub mod fs_guard;

pub mod inputs;

pub mod report;

pub use index::{build_index, BatchError, BatchMode, BatchOutcome, IndexBuilder, StatementIndex};
pub use registry::{PredicateRegistry, PREDICATE_REGISTRY};
pub use resolve::{resolve, SubjectMatching};
pub use statement::{decode_statement, Statement, StatementHeader, Subject};
pub use validate::{validate_statement, ValidationError};
