//! Unified Report Model
//!
//! Every stage of the build pipeline maps its findings to this report model
//! before rendering output, so `build`, `check`, `anchor list` and `collapse`
//! all print the same item shape.

use serde::{Deserialize, Serialize};

/// The kind of report item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A discovered or canonical document
    Document,
    /// An anchor index entry
    Anchor,
    /// A cross-reference (reported when broken)
    Link,
    /// A discarded near-duplicate document
    Duplicate,
    /// A file written to the output directory
    Output,
    /// A standalone issue not tied to a rendered artifact
    Error,
}

/// Severity of a report item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Pipeline stage that produced the item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Scan,
    Parse,
    Collapse,
    Index,
    Validate,
    Render,
}

/// 1-indexed, inclusive line range within a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: u32,
    pub end: u32,
}

impl LineRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Single-line range
    pub fn at(line: u32) -> Self {
        Self {
            start: line,
            end: line,
        }
    }
}

/// Metadata for a report item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Modification time in milliseconds since epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime_ms: Option<i64>,

    /// File size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Content hash (XXH3 or SHA1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Whether the excerpt was truncated
    #[serde(default)]
    pub truncated: bool,
}

/// A coded issue attached to a report item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub code: String,
    pub message: String,
}

impl Issue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified report item that every pipeline stage produces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportItem {
    /// The kind of this item
    pub kind: Kind,

    /// Path relative to the input root, using '/' as separator
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Line range within the source file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<LineRange>,

    /// Short excerpt (heading text, link target, issue detail)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Structured payload (anchor ids, similarity scores, canonical paths)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Severity of the finding
    pub severity: Severity,

    /// Which pipeline stage produced this item
    pub stage: Stage,

    /// Metadata
    pub meta: Meta,

    /// Issues (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

impl ReportItem {
    /// A discovered document
    pub fn document(path: impl Into<String>) -> Self {
        Self {
            kind: Kind::Document,
            path: Some(path.into()),
            range: None,
            excerpt: None,
            data: None,
            severity: Severity::Info,
            stage: Stage::Scan,
            meta: Meta::default(),
            issues: Vec::new(),
        }
    }

    /// An anchor index entry
    pub fn anchor(path: impl Into<String>, range: LineRange) -> Self {
        Self {
            kind: Kind::Anchor,
            path: Some(path.into()),
            range: Some(range),
            excerpt: None,
            data: None,
            severity: Severity::Info,
            stage: Stage::Index,
            meta: Meta::default(),
            issues: Vec::new(),
        }
    }

    /// A broken cross-reference
    pub fn broken_link(path: impl Into<String>, range: LineRange, issue: Issue) -> Self {
        Self {
            kind: Kind::Link,
            path: Some(path.into()),
            range: Some(range),
            excerpt: None,
            data: None,
            severity: Severity::Error,
            stage: Stage::Validate,
            meta: Meta::default(),
            issues: vec![issue],
        }
    }

    /// A discarded near-duplicate document
    pub fn duplicate(path: impl Into<String>) -> Self {
        Self {
            kind: Kind::Duplicate,
            path: Some(path.into()),
            range: None,
            excerpt: None,
            data: None,
            severity: Severity::Warning,
            stage: Stage::Collapse,
            meta: Meta::default(),
            issues: Vec::new(),
        }
    }

    /// A file written to the output directory
    pub fn output(path: impl Into<String>) -> Self {
        Self {
            kind: Kind::Output,
            path: Some(path.into()),
            range: None,
            excerpt: None,
            data: None,
            severity: Severity::Info,
            stage: Stage::Render,
            meta: Meta::default(),
            issues: Vec::new(),
        }
    }

    /// A standalone error item
    pub fn error(issue: Issue) -> Self {
        Self {
            kind: Kind::Error,
            path: None,
            range: None,
            excerpt: None,
            data: None,
            severity: Severity::Error,
            stage: Stage::Validate,
            meta: Meta::default(),
            issues: vec![issue],
        }
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Set the producing stage
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    /// Set the excerpt
    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    /// Set the structured payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Report set containing the findings of one command run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSet {
    pub items: Vec<ReportItem>,
}

impl ReportSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ReportItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, items: impl IntoIterator<Item = ReportItem>) {
        self.items.extend(items);
    }

    /// Sort items by path and range start for stable output
    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| {
            match (&a.path, &b.path) {
                (Some(pa), Some(pb)) => {
                    let path_cmp = pa.cmp(pb);
                    if path_cmp != std::cmp::Ordering::Equal {
                        return path_cmp;
                    }
                    // Compare by range start if paths are equal
                    match (&a.range, &b.range) {
                        (Some(ra), Some(rb)) => ra.start.cmp(&rb.start),
                        (Some(_), None) => std::cmp::Ordering::Less,
                        (None, Some(_)) => std::cmp::Ordering::Greater,
                        (None, None) => std::cmp::Ordering::Equal,
                    }
                }
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
        });
    }

    /// Whether any item carries error severity
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity == Severity::Error)
    }

    /// Count items with error severity
    pub fn error_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ReportSet {
    type Item = ReportItem;
    type IntoIter = std::vec::IntoIter<ReportItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<ReportItem> for ReportSet {
    fn from_iter<T: IntoIterator<Item = ReportItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
