use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing_subscriber::EnvFilter;

use intoto_scan::{
    fs_guard,
    index::BatchMode,
    inputs,
    policy::{ScanPolicy, DEFAULT_POLICY_FILE},
    registry::PREDICATE_REGISTRY,
    report,
    resolve::{resolve, SubjectMatching},
};

#[derive(Parser)]
#[command(
    name = "intoto-scan",
    about = "Validate and index in-toto attestation statements",
    version
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Validate one or more batches (files, or directories of *.jsonl)
    Validate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Scan policy JSON (defaults to intoto-scan-policy.json beside the first input if present)
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Keep going past bad lines and report all of them
        #[arg(long)]
        collect_errors: bool,

        /// Write a JSON report to this path
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the header of the first statement matching a predicate label
    Resolve {
        /// Batch file
        input: PathBuf,

        /// Human label, e.g. "CycloneDX" or "SLSA Provenance"
        #[arg(long)]
        label: String,

        /// Subject name (only filters with --strict-subject)
        #[arg(long, default_value = "")]
        subject: String,

        /// Require the statement to carry a subject with this exact name
        #[arg(long)]
        strict_subject: bool,

        #[arg(long)]
        policy: Option<PathBuf>,
    },

    /// List recognized predicate-type prefixes and their labels
    Labels,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Validate {
            paths,
            policy,
            collect_errors,
            report,
        } => validate_batches(&paths, policy, collect_errors, report),
        Cmd::Resolve {
            input,
            label,
            subject,
            strict_subject,
            policy,
        } => resolve_label(&input, &label, &subject, strict_subject, policy),
        Cmd::Labels => {
            list_labels();
            Ok(())
        }
    }
}

/// Explicit `--policy`, else the default policy file beside `first_input`.
fn load_policy(explicit: Option<PathBuf>, first_input: Option<&Path>) -> Result<ScanPolicy> {
    let policy_file = explicit.or_else(|| {
        let input = first_input?;
        let dir = if input.is_dir() { input } else { input.parent()? };
        let p = dir.join(DEFAULT_POLICY_FILE);
        p.exists().then_some(p)
    });
    ScanPolicy::load(policy_file.as_deref())
}

fn validate_batches(
    paths: &[PathBuf],
    policy_path: Option<PathBuf>,
    collect_errors: bool,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let mut policy = load_policy(policy_path, paths.first().map(PathBuf::as_path))?;
    if collect_errors {
        policy.batch_mode = BatchMode::CollectErrors;
    }
    let builder = policy.index_builder();

    let batches = inputs::collect_batches(paths)?;
    if batches.is_empty() {
        return Err(anyhow!("No batch files found"));
    }

    let mut entries = Vec::with_capacity(batches.len());
    let mut failed = 0usize;

    for path in &batches {
        let data = match fs_guard::read_validated(path, policy.max_input_bytes) {
            Ok(data) => data,
            Err(e) => {
                failed += 1;
                eprintln!("✗ {}: {e}", path.display());
                entries.push(report::unreadable_entry(&path.display().to_string(), &e));
                continue;
            }
        };
        let result = builder.build(&data);

        match &result {
            Ok(outcome) if outcome.is_clean() => {
                println!(
                    "✓ {}: {} statement(s), {} predicate type(s)",
                    path.display(),
                    outcome.index.statement_count(),
                    outcome.index.len()
                );
            }
            Ok(outcome) => {
                failed += 1;
                eprintln!(
                    "✗ {}: {} statement(s) accepted, {} line(s) rejected",
                    path.display(),
                    outcome.index.statement_count(),
                    outcome.rejected.len()
                );
                for r in &outcome.rejected {
                    eprintln!("    line {}: {}", r.line, r.error);
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("✗ {}: {e}", path.display());
            }
        }

        entries.push(report::batch_entry(
            &path.display().to_string(),
            &data,
            &result,
        ));
    }

    if let Some(out) = &report_path {
        let report = report::make_report(entries)?;
        fs::write(out, serde_json::to_vec_pretty(&report)?)
            .with_context(|| format!("writing report {}", out.display()))?;
        println!("→ Report: {}", out.display());
    }

    if failed > 0 {
        return Err(anyhow!(
            "{failed} of {} batch(es) failed validation",
            batches.len()
        ));
    }
    Ok(())
}

fn resolve_label(
    input: &Path,
    label: &str,
    subject: &str,
    strict_subject: bool,
    policy_path: Option<PathBuf>,
) -> Result<()> {
    let mut policy = load_policy(policy_path, Some(input))?;
    if strict_subject {
        policy.subject_matching = SubjectMatching::Strict;
    }

    let data = fs_guard::read_validated(input, policy.max_input_bytes)?;
    // Resolution only ever sees a fully trusted batch.
    policy.batch_mode = BatchMode::FailFast;
    let outcome = policy
        .index_builder()
        .build(&data)
        .with_context(|| format!("validating {}", input.display()))?;

    let header = resolve(&outcome.index, label, subject, policy.subject_matching);
    if header.is_empty() {
        eprintln!("no statement found for label {label:?}");
        println!("null");
    } else {
        println!("{}", serde_json::to_string_pretty(&header)?);
    }
    Ok(())
}

/// One block per label: every prefix carrying it, with the one label
/// lookups resolve to marked.
fn list_labels() {
    for label in PREDICATE_REGISTRY.labels() {
        println!("{label}");
        let chosen = PREDICATE_REGISTRY.prefix_for_label(label);
        for prefix in PREDICATE_REGISTRY.prefixes_for_label(label) {
            if Some(prefix) == chosen {
                println!("  * {prefix}");
            } else {
                println!("    {prefix}");
            }
        }
    }
}
