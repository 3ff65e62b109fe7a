//! Link validation
//!
//! Resolves every cross-reference in the canonical document set against the
//! anchor index. Broken links are collected, never aborting: the caller gets
//! the full list in one pass.

use crate::core::model::{Issue, LineRange, ReportItem};
use crate::docs::index::AnchorIndex;
use crate::docs::parse::Document;

/// Why a cross-reference failed to resolve
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokenLinkKind {
    /// The target document is not in the canonical set
    UnknownDocument,
    /// The target document exists but the anchor does not
    UnknownAnchor,
}

/// A cross-reference that failed to resolve
#[derive(Debug, Clone)]
pub struct BrokenLink {
    pub kind: BrokenLinkKind,
    /// Source document id
    pub doc: String,
    /// 1-indexed source line
    pub line: u32,
    /// The raw link target as written
    pub raw: String,
    /// The anchor that failed to resolve, if the reference named one
    pub anchor: Option<String>,
}

impl BrokenLink {
    pub fn to_report_item(&self) -> ReportItem {
        let message = match (&self.kind, &self.anchor) {
            (BrokenLinkKind::UnknownDocument, _) => {
                format!("link target '{}' does not resolve to a document", self.raw)
            }
            (BrokenLinkKind::UnknownAnchor, Some(anchor)) => {
                format!("anchor '{}' not found for link '{}'", anchor, self.raw)
            }
            (BrokenLinkKind::UnknownAnchor, None) => {
                format!("anchor not found for link '{}'", self.raw)
            }
        };

        ReportItem::broken_link(
            self.doc.clone(),
            LineRange::at(self.line),
            Issue::new("BROKEN_LINK", message),
        )
        .with_excerpt(self.raw.clone())
        .with_data(serde_json::json!({
            "target": self.raw,
            "anchor": self.anchor,
        }))
    }
}

/// Validate all cross-references in `docs` against `index`.
///
/// `docs` must be the canonical set; references are resolved against it and
/// every failure is returned. References from documents the index rejected
/// (duplicate anchors) are skipped by the caller not passing them in.
pub fn validate_links(docs: &[Document], index: &AnchorIndex) -> Vec<BrokenLink> {
    let mut broken = Vec::new();

    for doc in docs {
        for r in &doc.refs {
            let target_doc = r.target_doc.as_deref().unwrap_or(&doc.id);

            if !index.has_doc(target_doc) {
                broken.push(BrokenLink {
                    kind: BrokenLinkKind::UnknownDocument,
                    doc: doc.id.clone(),
                    line: r.line,
                    raw: r.raw.clone(),
                    anchor: r.anchor.clone(),
                });
                continue;
            }

            if let Some(anchor) = &r.anchor {
                if !index.resolve(target_doc, anchor) {
                    broken.push(BrokenLink {
                        kind: BrokenLinkKind::UnknownAnchor,
                        doc: doc.id.clone(),
                        line: r.line,
                        raw: r.raw.clone(),
                        anchor: Some(anchor.clone()),
                    });
                }
            }
        }
    }

    broken
}
