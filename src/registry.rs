//! Predicate registry: the recognized predicate-type URI prefixes and the
//! human-readable labels that resolve to them.
//!
//! The table is a `static` slice. It is never mutated, so it can be read
//! from any number of threads without coordination.
//!
//! ## Matching
//!
//! Prefixes match predicate types by *containment*, not equality, so
//! versioned URIs such as `https://slsa.dev/provenance/v1` are recognized
//! through the `https://slsa.dev/provenance/` entry.
//!
//! ## Tie-break
//!
//! A label may appear under more than one prefix (`SPDX` and `CycloneDX`
//! each have two). Reverse lookups walk the table in declaration order and
//! return the first hit.

/// One row of the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryEntry {
    pub prefix: &'static str,
    pub labels: &'static [&'static str],
}

/// Read-only mapping between canonical prefixes and labels.
#[derive(Debug)]
pub struct PredicateRegistry {
    entries: &'static [RegistryEntry],
}

/// The canonical registry. Prefixes are bit-for-bit compatible with the
/// predicate types emitted by existing attestation tooling.
pub static PREDICATE_REGISTRY: PredicateRegistry = PredicateRegistry {
    entries: &[
        RegistryEntry {
            prefix: "https://slsa.dev/provenance/",
            labels: &["SLSA Provenance", "Provenance"],
        },
        RegistryEntry {
            prefix: "https://in-toto.io/attestation/",
            labels: &[
                "Link",
                "SCAI Report",
                "Runtime Traces",
                "Vulnerability",
                "Release",
                "Test Result",
            ],
        },
        RegistryEntry {
            prefix: "https://slsa.dev/verification_summary/v1",
            labels: &["SLSA Verification Summary"],
        },
        RegistryEntry {
            prefix: "https://spdx.dev/Document",
            labels: &["SPDX"],
        },
        RegistryEntry {
            prefix: "https://spdx.github.io/spdx-spec",
            labels: &["SPDX"],
        },
        RegistryEntry {
            prefix: "https://cyclonedx.org/bom",
            labels: &["CycloneDX"],
        },
        RegistryEntry {
            prefix: "https://cyclonedx.org/specification/overview/",
            labels: &["CycloneDX"],
        },
    ],
};

impl PredicateRegistry {
    /// Builds a registry over an arbitrary table. Mostly useful for tests
    /// that need a non-injective label mapping.
    pub const fn from_entries(entries: &'static [RegistryEntry]) -> Self {
        Self { entries }
    }

    /// All entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.iter()
    }

    /// Every distinct label, in order of first declaration.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for label in self.entries.iter().flat_map(|e| e.labels.iter().copied()) {
            if !out.contains(&label) {
                out.push(label);
            }
        }
        out
    }

    /// Labels registered for an exact prefix.
    pub fn labels_for(&self, prefix: &str) -> Option<&'static [&'static str]> {
        self.entries
            .iter()
            .find(|e| e.prefix == prefix)
            .map(|e| e.labels)
    }

    /// Reverse lookup: the first prefix (declaration order) carrying `label`.
    pub fn prefix_for_label(&self, label: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.labels.contains(&label))
            .map(|e| e.prefix)
    }

    /// Every prefix carrying `label`, in declaration order.
    pub fn prefixes_for_label(&self, label: &str) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.labels.contains(&label))
            .map(|e| e.prefix)
            .collect()
    }

    /// The first registered prefix contained in `predicate_type`, if any.
    pub fn recognized_prefix(&self, predicate_type: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| predicate_type.contains(e.prefix))
            .map(|e| e.prefix)
    }

    pub fn is_recognized(&self, predicate_type: &str) -> bool {
        self.recognized_prefix(predicate_type).is_some()
    }
}
