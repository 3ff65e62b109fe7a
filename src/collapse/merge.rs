//! Duplicate collapsing
//!
//! Groups documents whose combined similarity meets the threshold and keeps
//! one canonical copy per group: the most complete version (most sections),
//! ties broken by newest mtime, then lexicographic path.

use serde::{Deserialize, Serialize};

use crate::collapse::similarity::Fingerprint;
use crate::core::model::ReportItem;
use crate::docs::parse::Document;

/// Default similarity threshold for collapsing
pub const DEFAULT_THRESHOLD: f64 = 0.9;

/// A document discarded in favor of a canonical copy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discarded {
    /// Id of the discarded document
    pub id: String,
    /// Id of the canonical document that replaces it
    pub canonical: String,
    /// Similarity of the discarded copy to the canonical one
    pub similarity: f64,
}

impl Discarded {
    pub fn to_report_item(&self) -> ReportItem {
        ReportItem::duplicate(self.id.clone()).with_data(serde_json::json!({
            "canonical": self.canonical,
            "similarity": (self.similarity * 1000.0).round() / 1000.0,
        }))
    }
}

/// Result of collapsing a document set
#[derive(Debug)]
pub struct CollapseOutcome {
    /// Canonical documents, in input order
    pub canonical: Vec<Document>,
    /// Discarded near-duplicates
    pub discarded: Vec<Discarded>,
}

/// Rank for canonical selection: more sections wins, then newer mtime, then
/// lexicographically smaller id.
fn better_canonical(a: &Document, b: &Document) -> bool {
    let sections = a.sections.len().cmp(&b.sections.len());
    if sections != std::cmp::Ordering::Equal {
        return sections == std::cmp::Ordering::Greater;
    }
    let mtime = a.mtime_ms.cmp(&b.mtime_ms);
    if mtime != std::cmp::Ordering::Equal {
        return mtime == std::cmp::Ordering::Greater;
    }
    a.id < b.id
}

/// Union-find over document indices
struct Groups {
    parent: Vec<usize>,
}

impl Groups {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, i: usize) -> usize {
        if self.parent[i] != i {
            let root = self.find(self.parent[i]);
            self.parent[i] = root;
        }
        self.parent[i]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Collapse near-duplicate documents.
///
/// Grouping is transitive: if A~B and B~C meet the threshold, all three form
/// one group even when A~C falls below it.
pub fn collapse_documents(docs: Vec<Document>, threshold: f64) -> CollapseOutcome {
    let fingerprints: Vec<Fingerprint> =
        docs.iter().map(|d| Fingerprint::of(&d.plain_text())).collect();

    let mut groups = Groups::new(docs.len());
    for i in 0..docs.len() {
        for j in (i + 1)..docs.len() {
            if fingerprints[i].similarity(&fingerprints[j]) >= threshold {
                groups.union(i, j);
            }
        }
    }

    // Pick the canonical member of each group
    let mut canonical_of_root: std::collections::HashMap<usize, usize> =
        std::collections::HashMap::new();
    for i in 0..docs.len() {
        let root = groups.find(i);
        match canonical_of_root.get(&root) {
            Some(&best) if !better_canonical(&docs[i], &docs[best]) => {}
            _ => {
                canonical_of_root.insert(root, i);
            }
        }
    }

    let mut discarded = Vec::new();
    let mut keep = vec![false; docs.len()];
    for i in 0..docs.len() {
        let root = groups.find(i);
        let best = canonical_of_root[&root];
        if i == best {
            keep[i] = true;
        } else {
            discarded.push(Discarded {
                id: docs[i].id.clone(),
                canonical: docs[best].id.clone(),
                similarity: fingerprints[i].similarity(&fingerprints[best]),
            });
        }
    }

    let canonical = docs
        .into_iter()
        .zip(keep)
        .filter_map(|(doc, k)| if k { Some(doc) } else { None })
        .collect();

    discarded.sort_by(|a, b| a.id.cmp(&b.id));

    CollapseOutcome {
        canonical,
        discarded,
    }
}
