use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::index::{BatchMode, IndexBuilder};
use crate::resolve::SubjectMatching;

/// Maximum policy file size (1 MB).
const MAX_POLICY_BYTES: u64 = 1024 * 1024;

/// File name picked up next to the inputs when no policy is given.
pub const DEFAULT_POLICY_FILE: &str = "intoto-scan-policy.json";

/// Scan configuration. Every key is optional in the JSON form; missing keys
/// take the strict defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPolicy {
    #[serde(default)]
    pub batch_mode: BatchMode,
    #[serde(default)]
    pub subject_matching: SubjectMatching,
    #[serde(default)]
    pub skip_blank_lines: bool,
    /// Upper bound on a single batch file.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,
}

fn default_max_input_bytes() -> u64 {
    64 * 1024 * 1024
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            batch_mode: BatchMode::FailFast,
            subject_matching: SubjectMatching::FirstMatch,
            skip_blank_lines: false,
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

impl ScanPolicy {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                let raw = crate::fs_guard::read_validated(p, MAX_POLICY_BYTES)?;
                serde_json::from_slice(&raw)
                    .with_context(|| format!("parsing policy {}", p.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn index_builder(&self) -> IndexBuilder {
        IndexBuilder::new(self.batch_mode).skip_blank_lines(self.skip_blank_lines)
    }
}
