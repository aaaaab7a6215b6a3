//! JSON report of a validation run.
//!
//! One entry per batch, with the SHA-256 of the exact bytes that were
//! validated so a report can be tied back to its input.

use anyhow::Result;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::index::{BatchError, BatchOutcome, StatementIndex};
use crate::registry::PREDICATE_REGISTRY;

pub const REPORT_SCHEMA: &str = "https://intoto-scan.dev/report/v1";

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Per-group summary: literal predicate type, the registry prefix it matched
/// and that prefix's labels, statement count and subject names.
pub fn summarize_index(index: &StatementIndex) -> Value {
    let groups: Vec<Value> = index
        .groups()
        .iter()
        .map(|g| {
            let prefix = PREDICATE_REGISTRY.recognized_prefix(g.predicate_type());
            let labels = prefix
                .and_then(|p| PREDICATE_REGISTRY.labels_for(p))
                .unwrap_or_default();
            let subjects: Vec<&str> = g
                .statements()
                .iter()
                .flat_map(|s| s.subjects.iter().map(|sub| sub.name.as_str()))
                .collect();
            json!({
                "predicateType": g.predicate_type(),
                "prefix": prefix,
                "labels": labels,
                "statements": g.statements().len(),
                "subjects": subjects,
            })
        })
        .collect();
    Value::Array(groups)
}

/// Report entry for one batch.
pub fn batch_entry(
    path: &str,
    input: &[u8],
    result: &std::result::Result<BatchOutcome, BatchError>,
) -> Value {
    let sha = sha256_hex(input);
    match result {
        Ok(outcome) => {
            let rejected: Vec<Value> = outcome
                .rejected
                .iter()
                .map(|r| json!({ "line": r.line, "error": r.error.to_string() }))
                .collect();
            json!({
                "path": path,
                "sha256": sha,
                "result": if outcome.is_clean() { "PASS" } else { "FAIL" },
                "error": Value::Null,
                "statements": outcome.index.statement_count(),
                "groups": summarize_index(&outcome.index),
                "rejected": rejected,
            })
        }
        Err(e) => json!({
            "path": path,
            "sha256": sha,
            "result": "FAIL",
            "error": e.to_string(),
            "line": e.line(),
            "statements": 0,
            "groups": [],
            "rejected": [],
        }),
    }
}

/// Report entry for a batch that could not be read at all.
pub fn unreadable_entry(path: &str, error: &anyhow::Error) -> Value {
    json!({
        "path": path,
        "sha256": Value::Null,
        "result": "FAIL",
        "error": format!("{error:#}"),
        "line": Value::Null,
        "statements": 0,
        "groups": [],
        "rejected": [],
    })
}

/// Wraps batch entries into the top-level report.
pub fn make_report(batches: Vec<Value>) -> Result<Value> {
    let now = OffsetDateTime::now_utc().format(&Rfc3339)?;
    let overall_pass = batches.iter().all(|b| b["result"] == "PASS");
    Ok(json!({
        "report_schema": REPORT_SCHEMA,
        "version": env!("CARGO_PKG_VERSION"),
        "generated_at": now,
        "result": if overall_pass { "PASS" } else { "FAIL" },
        "batches": batches,
    }))
}
