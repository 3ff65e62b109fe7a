//! Anchor index
//!
//! Maps anchor -> section location per document. Anchors must be unique
//! within a document after slug normalization; a duplicate is fatal for that
//! document only, which is then excluded from validation and rendering.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::core::model::LineRange;
use crate::docs::parse::Document;

/// Anchor indexing errors
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("duplicate anchor '{anchor}' in {path}: declared at line {first} and line {second}")]
    DuplicateAnchor {
        anchor: String,
        path: String,
        first: u32,
        second: u32,
    },
}

impl IndexError {
    /// Line of the offending declaration, for report items
    pub fn line(&self) -> u32 {
        match self {
            IndexError::DuplicateAnchor { second, .. } => *second,
        }
    }
}

/// Location of one anchor within the collection
#[derive(Debug, Clone)]
pub struct AnchorEntry {
    pub anchor: String,
    pub doc: String,
    pub heading: String,
    pub range: LineRange,
    pub explicit: bool,
}

/// Anchor index for the canonical document set
#[derive(Debug, Clone, Default)]
pub struct AnchorIndex {
    // doc id -> anchor -> entry; BTreeMaps keep report output stable
    by_doc: BTreeMap<String, BTreeMap<String, AnchorEntry>>,
}

/// Result of indexing a document set
#[derive(Debug, Default)]
pub struct IndexOutcome {
    pub index: AnchorIndex,
    /// Documents rejected with the error that rejected them
    pub failures: Vec<(String, IndexError)>,
}

/// Index a single document, failing on the first duplicate anchor
pub fn index_document(doc: &Document) -> Result<BTreeMap<String, AnchorEntry>, IndexError> {
    let mut anchors: BTreeMap<String, AnchorEntry> = BTreeMap::new();

    for section in doc.anchored_sections() {
        let anchor = section
            .anchor
            .clone()
            .unwrap_or_default();

        if let Some(existing) = anchors.get(&anchor) {
            return Err(IndexError::DuplicateAnchor {
                anchor,
                path: doc.id.clone(),
                first: existing.range.start,
                second: section.range.start,
            });
        }

        anchors.insert(
            anchor.clone(),
            AnchorEntry {
                anchor,
                doc: doc.id.clone(),
                heading: section.heading.clone(),
                range: section.range,
                explicit: section.explicit_anchor,
            },
        );
    }

    Ok(anchors)
}

impl AnchorIndex {
    /// Build the index over a document set. Documents with duplicate anchors
    /// are excluded and reported as failures; the rest index normally.
    pub fn build(docs: &[Document]) -> IndexOutcome {
        let mut outcome = IndexOutcome::default();

        for doc in docs {
            match index_document(doc) {
                Ok(anchors) => {
                    outcome.index.by_doc.insert(doc.id.clone(), anchors);
                }
                Err(err) => outcome.failures.push((doc.id.clone(), err)),
            }
        }

        outcome
    }

    /// Whether a document is present in the index
    pub fn has_doc(&self, doc: &str) -> bool {
        self.by_doc.contains_key(doc)
    }

    /// Whether an anchor exists in a document
    pub fn resolve(&self, doc: &str, anchor: &str) -> bool {
        self.by_doc
            .get(doc)
            .map(|anchors| anchors.contains_key(anchor))
            .unwrap_or(false)
    }

    /// All entries in stable (doc, anchor) order
    pub fn entries(&self) -> impl Iterator<Item = &AnchorEntry> {
        self.by_doc.values().flat_map(|anchors| anchors.values())
    }

    /// Entries for one document in stable anchor order
    pub fn entries_for(&self, doc: &str) -> impl Iterator<Item = &AnchorEntry> {
        self.by_doc
            .get(doc)
            .into_iter()
            .flat_map(|anchors| anchors.values())
    }

    /// Number of indexed anchors across all documents
    pub fn len(&self) -> usize {
        self.by_doc.values().map(|a| a.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::parse::parse_content;

    #[test]
    fn test_index_unique_anchors() {
        let doc = parse_content("# A\n\n## B\n\n## C\n", "faq.md", 0);
        let anchors = index_document(&doc).unwrap();
        assert_eq!(anchors.len(), 3);
        assert!(anchors.contains_key("a"));
        assert!(anchors.contains_key("b"));
        assert!(anchors.contains_key("c"));
    }

    #[test]
    fn test_duplicate_anchor_fails() {
        // Two headings slugify to the same anchor
        let doc = parse_content("## Setup\n\n## Setup!\n", "faq.md", 0);
        let err = index_document(&doc).unwrap_err();
        match err {
            IndexError::DuplicateAnchor {
                anchor,
                path,
                first,
                second,
            } => {
                assert_eq!(anchor, "setup");
                assert_eq!(path, "faq.md");
                assert_eq!(first, 1);
                assert_eq!(second, 3);
            }
        }
    }

    #[test]
    fn test_explicit_anchor_collision() {
        let doc = parse_content("## One {#x}\n\n## Two {#x}\n", "faq.md", 0);
        assert!(index_document(&doc).is_err());
    }

    #[test]
    fn test_build_excludes_only_failing_document() {
        let good = parse_content("# A\n", "good.md", 0);
        let bad = parse_content("## X\n\n## X\n", "bad.md", 0);
        let outcome = AnchorIndex::build(&[good, bad]);

        assert!(outcome.index.has_doc("good.md"));
        assert!(!outcome.index.has_doc("bad.md"));
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, "bad.md");
    }

    #[test]
    fn test_resolve() {
        let doc = parse_content("# FAQ\n\n## Install {#install}\n", "faq.md", 0);
        let outcome = AnchorIndex::build(&[doc]);
        assert!(outcome.index.resolve("faq.md", "install"));
        assert!(outcome.index.resolve("faq.md", "faq"));
        assert!(!outcome.index.resolve("faq.md", "missing"));
        assert!(!outcome.index.resolve("other.md", "install"));
    }

    #[test]
    fn test_every_declared_anchor_indexed_once() {
        let doc = parse_content("# A\n\n## B\n\n### C\n\n## D\n", "faq.md", 0);
        let declared: Vec<_> = doc
            .anchored_sections()
            .map(|s| s.anchor.clone().unwrap())
            .collect();
        let outcome = AnchorIndex::build(std::slice::from_ref(&doc));

        assert_eq!(outcome.index.len(), declared.len());
        for anchor in declared {
            assert!(outcome.index.resolve("faq.md", &anchor));
        }
    }

    #[test]
    fn test_entries_are_sorted() {
        let doc = parse_content("# Zebra\n\n## Alpha\n", "faq.md", 0);
        let outcome = AnchorIndex::build(&[doc]);
        let anchors: Vec<_> = outcome.index.entries().map(|e| e.anchor.clone()).collect();
        assert_eq!(anchors, vec!["alpha", "zebra"]);
    }
}
