//! Contract tests for the public library API: validation rules, batch
//! atomicity, grouping and label resolution.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use intoto_scan::index::LineError;
use intoto_scan::{
    build_index, decode_statement, resolve, validate_statement, BatchError, BatchMode,
    IndexBuilder, SubjectMatching, ValidationError, PREDICATE_REGISTRY,
};

const TYPE_V1: &str = "https://in-toto.io/Statement/v1";

fn stmt(ty: &str, pred: &str, subjects: &str) -> String {
    format!(r#"{{"_type":"{ty}","predicateType":"{pred}","subject":{subjects},"predicate":{{}}}}"#)
}

fn valid(pred: &str, name: &str) -> String {
    stmt(
        TYPE_V1,
        pred,
        &format!(r#"[{{"name":"{name}","digest":{{"sha256":"00"}}}}]"#),
    )
}

fn validation_error(line: &str) -> ValidationError {
    let s = decode_statement(line.as_bytes()).unwrap();
    validate_statement(&s).unwrap_err()
}

#[test]
fn example_scenario() {
    let input = r#"{"_type":"https://in-toto.io/Statement/v1","predicateType":"https://cyclonedx.org/bom","subject":[{"name":"pkg:foo"}],"predicate":{}}"#;
    let index = build_index(input.as_bytes()).unwrap();

    assert_eq!(
        index.predicate_types().collect::<Vec<_>>(),
        vec!["https://cyclonedx.org/bom"]
    );
    assert_eq!(index.get("https://cyclonedx.org/bom").unwrap().len(), 1);

    let header = resolve(&index, "CycloneDX", "pkg:foo", SubjectMatching::FirstMatch);
    assert_eq!(header.statement_type, TYPE_V1);
    assert_eq!(header.predicate_type, "https://cyclonedx.org/bom");
}

#[test]
fn each_rule_has_its_own_error() {
    let one = r#"[{"name":"a"}]"#;
    assert!(matches!(
        validation_error(&stmt("https://in-toto.io/Statement/v0.1", "https://cyclonedx.org/bom", one)),
        ValidationError::InvalidType(_)
    ));
    assert_eq!(
        validation_error(&stmt(TYPE_V1, "", one)),
        ValidationError::EmptyPredicateType
    );
    assert!(matches!(
        validation_error(&stmt(TYPE_V1, "https://example.org/attestation/", one)),
        ValidationError::UnrecognizedPredicateType(_)
    ));
    assert_eq!(
        validation_error(&stmt(TYPE_V1, "https://cyclonedx.org/bom", "[]")),
        ValidationError::EmptySubject
    );
    assert_eq!(
        validation_error(&stmt(TYPE_V1, "https://cyclonedx.org/bom", r#"[{"name":"a"},{"name":""}]"#)),
        ValidationError::EmptySubjectName(1)
    );
}

#[test]
fn missing_fields_are_validation_errors_not_decode_errors() {
    assert!(matches!(validation_error("{}"), ValidationError::InvalidType(_)));
    assert_eq!(
        validation_error(&format!(r#"{{"_type":"{TYPE_V1}"}}"#)),
        ValidationError::EmptyPredicateType
    );
    assert_eq!(
        validation_error(&format!(
            r#"{{"_type":"{TYPE_V1}","predicateType":"https://spdx.dev/Document"}}"#
        )),
        ValidationError::EmptySubject
    );
}

#[test]
fn null_line_fails_as_invalid_type() {
    assert!(matches!(validation_error("null"), ValidationError::InvalidType(_)));

    let input = format!("{}\nnull", valid("https://cyclonedx.org/bom", "a"));
    match build_index(input.as_bytes()).unwrap_err() {
        BatchError::Line {
            line,
            source: LineError::Validation(ValidationError::InvalidType(_)),
        } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn partition_preserves_count_order_and_literal_keys() {
    let preds = [
        "https://slsa.dev/provenance/v1",
        "https://spdx.dev/Document",
        "https://in-toto.io/attestation/vulns/v0.1",
        "https://slsa.dev/provenance/v1",
        "https://spdx.github.io/spdx-spec/v2.3/",
        "https://in-toto.io/attestation/vulns/v0.1",
        "https://slsa.dev/verification_summary/v1",
        "https://cyclonedx.org/specification/overview/",
    ];
    let lines: Vec<String> = preds
        .iter()
        .enumerate()
        .map(|(i, p)| valid(p, &format!("artifact-{i}")))
        .collect();
    let index = build_index(lines.join("\n").as_bytes()).unwrap();

    assert_eq!(index.statement_count(), preds.len());
    assert_eq!(index.len(), 6);

    for group in index.groups() {
        for s in group.statements() {
            assert_eq!(s.predicate_type, group.predicate_type());
        }
        // Arrival order inside a group.
        let positions: Vec<usize> = group
            .statements()
            .iter()
            .map(|s| s.subjects[0].name["artifact-".len()..].parse().unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    let prov = index.get("https://slsa.dev/provenance/v1").unwrap();
    assert_eq!(prov[0].subjects[0].name, "artifact-0");
    assert_eq!(prov[1].subjects[0].name, "artifact-3");
}

#[test]
fn one_bad_line_rejects_the_whole_batch() {
    for bad in ["{", "", "[]", r#"{"_type":"https://in-toto.io/Statement/v1"}"#] {
        let mut lines: Vec<String> = (0..5)
            .map(|i| valid("https://cyclonedx.org/bom", &format!("c{i}")))
            .collect();
        lines.push(bad.to_string());
        let result = build_index(lines.join("\n").as_bytes());
        let err = result.unwrap_err();
        assert_eq!(err.line(), Some(6), "bad line {bad:?}");
    }
}

#[test]
fn first_error_wins_in_fail_fast_mode() {
    let lines = [
        valid("https://cyclonedx.org/bom", "a"),
        stmt(TYPE_V1, "https://cyclonedx.org/bom", "[]"),
        "not json".to_string(),
    ];
    let err = build_index(lines.join("\n").as_bytes()).unwrap_err();
    match err {
        BatchError::Line {
            line,
            source: LineError::Validation(ValidationError::EmptySubject),
        } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn collect_mode_reports_every_bad_line() {
    let lines = [
        "not json".to_string(),
        valid("https://cyclonedx.org/bom", "a"),
        stmt(TYPE_V1, "https://cyclonedx.org/bom", "[]"),
        valid("https://spdx.dev/Document", "b"),
    ];
    let outcome = IndexBuilder::new(BatchMode::CollectErrors)
        .build(lines.join("\n").as_bytes())
        .unwrap();
    assert_eq!(outcome.index.statement_count(), 2);
    assert_eq!(
        outcome.rejected.iter().map(|r| r.line).collect::<Vec<_>>(),
        vec![1, 3]
    );
}

#[test]
fn resolve_absent_kind_is_not_an_error() {
    let index = build_index(valid("https://cyclonedx.org/bom", "a").as_bytes()).unwrap();
    assert!(resolve(&index, "SLSA Provenance", "a", SubjectMatching::FirstMatch).is_empty());
}

#[test]
fn every_label_resolves_against_its_first_prefix() {
    for entry in PREDICATE_REGISTRY.entries() {
        let index = build_index(valid(entry.prefix, "a").as_bytes()).unwrap();
        for label in entry.labels {
            let first = PREDICATE_REGISTRY.prefix_for_label(label).unwrap();
            let header = resolve(&index, label, "a", SubjectMatching::FirstMatch);
            if entry.prefix.contains(first) {
                assert_eq!(header.predicate_type, entry.prefix, "label {label}");
            } else {
                assert!(header.is_empty(), "label {label} on {}", entry.prefix);
            }
        }
    }
}

#[test]
fn batches_can_be_built_on_separate_threads() {
    let handles: Vec<_> = ["https://spdx.dev/Document", "https://cyclonedx.org/bom"]
        .into_iter()
        .map(|p| {
            let input = valid(p, "x");
            std::thread::spawn(move || build_index(input.as_bytes()).map(|i| i.statement_count()))
        })
        .collect();
    for h in handles {
        assert_eq!(h.join().unwrap().unwrap(), 1);
    }
}
