//! Build manifest
//!
//! A machine-readable record of what the build produced, written as
//! manifest.json next to the rendered site. Contains no timestamps so
//! unchanged input yields a byte-identical manifest.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::collapse::merge::Discarded;
use crate::core::paths::output_path;
use crate::core::util::{hash_bytes, HashAlgorithm};
use crate::docs::parse::Document;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Entry for one canonical document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// SHA1 of the source content hash chain (stable long-form digest)
    pub hash: String,
    /// Rendered output path
    pub output: String,
    /// Number of sections
    pub sections: usize,
}

/// The build manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// faqc version that produced the build
    pub generator: String,

    /// Collapse threshold in effect
    pub threshold: f64,

    /// Canonical documents by id (sorted by the BTreeMap)
    pub documents: BTreeMap<String, ManifestEntry>,

    /// Discarded near-duplicates
    pub collapsed: Vec<Discarded>,
}

impl Manifest {
    pub fn new(docs: &[Document], collapsed: Vec<Discarded>, threshold: f64) -> Self {
        let mut documents = BTreeMap::new();
        for doc in docs {
            documents.insert(
                doc.id.clone(),
                ManifestEntry {
                    hash: hash_bytes(doc.hash.as_bytes(), HashAlgorithm::Sha1),
                    output: output_path(&doc.id),
                    sections: doc.sections.len(),
                },
            );
        }

        Self {
            generator: format!("faqc {}", env!("CARGO_PKG_VERSION")),
            threshold,
            documents,
            collapsed,
        }
    }
}

/// Write the manifest into the output directory
pub fn write_manifest(out_dir: &Path, manifest: &Manifest) -> Result<()> {
    let path = out_dir.join(MANIFEST_FILE);
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read a manifest back (used by tests and tooling)
pub fn read_manifest(out_dir: &Path) -> Result<Manifest> {
    let path = out_dir.join(MANIFEST_FILE);
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let manifest = serde_json::from_str(&content)?;
    Ok(manifest)
}
