//! The build pipeline
//!
//! Wires the stages together: scan, parse, collapse, index, validate and
//! render. `check` runs the same pipeline without the render stage. Every
//! stage contributes to one ReportSet; error severity anywhere in it drives
//! the process exit code.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::build::html;
use crate::build::manifest::{write_manifest, Manifest, MANIFEST_FILE};
use crate::build::scan::{scan_sources, SourceFile};
use crate::collapse::merge::{collapse_documents, CollapseOutcome, Discarded};
use crate::core::file_reader::read_file_safe;
use crate::core::model::{Issue, Kind, LineRange, Meta, ReportItem, ReportSet, Stage};
use crate::core::util::truncate_string;
use crate::docs::index::AnchorIndex;
use crate::docs::links::validate_links;
use crate::docs::parse::{parse_content, Document};

/// Pipeline options shared by all commands
#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Collapse similarity threshold
    pub threshold: f64,
    /// Suppress the stderr summary
    pub quiet: bool,
}

/// Outcome of a pipeline run
pub struct PipelineOutcome {
    pub report: ReportSet,
    /// Canonical documents that survived collapsing and indexing
    pub canonical: Vec<Document>,
}

impl PipelineOutcome {
    /// Whether the run found validation errors (drives exit code 1)
    pub fn failed(&self) -> bool {
        self.report.has_errors()
    }
}

/// Load sources into parsed documents, reporting unreadable files
fn load_documents(sources: &[SourceFile], report: &mut ReportSet) -> Vec<Document> {
    let mut docs = Vec::new();

    for source in sources {
        let read = read_file_safe(&source.abs);
        for warning in &read.warnings {
            let mut item = warning.to_report_item();
            item.path = Some(source.rel.clone());
            item.stage = Stage::Scan;
            report.push(item);
        }
        if let Some(content) = read.content {
            docs.push(parse_content(&content, &source.rel, source.mtime_ms));
        }
    }

    docs
}

fn duplicate_anchor_item(doc_id: &str, err: &crate::docs::index::IndexError) -> ReportItem {
    let mut item =
        ReportItem::error(Issue::new("DUPLICATE_ANCHOR", err.to_string())).with_stage(Stage::Index);
    item.path = Some(doc_id.to_string());
    item.range = Some(LineRange::at(err.line()));
    item
}

struct Analysis {
    canonical: Vec<Document>,
    discarded: Vec<Discarded>,
}

/// Excerpts are capped; anything longer is flagged in the item meta
const MAX_EXCERPT_BYTES: usize = 200;

fn document_item(doc: &Document) -> ReportItem {
    let mut item = ReportItem::document(doc.id.clone()).with_stage(Stage::Parse);
    let mut meta = Meta {
        hash: Some(doc.hash.clone()),
        mtime_ms: Some(doc.mtime_ms),
        ..Default::default()
    };
    if let Some(title) = &doc.title {
        let (excerpt, truncated) = truncate_string(title, MAX_EXCERPT_BYTES);
        meta.truncated = truncated;
        item = item.with_excerpt(excerpt);
    }
    let lines: usize = doc.sections.iter().map(|s| s.body_lines()).sum();
    item.with_meta(meta).with_data(serde_json::json!({
        "sections": doc.sections.len(),
        "lines": lines,
    }))
}

/// Run scan/parse/collapse/index/validate.
///
/// Documents rejected by the index (duplicate anchors) are removed from the
/// canonical set; their cross-references are not validated.
fn analyze(root: &Path, opts: PipelineOptions, report: &mut ReportSet) -> Result<Analysis> {
    let sources = scan_sources(root)?;
    let docs = load_documents(&sources, report);

    let CollapseOutcome {
        canonical,
        discarded,
    } = collapse_documents(docs, opts.threshold);

    for d in &discarded {
        report.push(d.to_report_item());
    }

    let outcome = AnchorIndex::build(&canonical);
    for (doc_id, err) in &outcome.failures {
        report.push(duplicate_anchor_item(doc_id, err));
    }

    let canonical: Vec<Document> = canonical
        .into_iter()
        .filter(|d| outcome.index.has_doc(&d.id))
        .collect();

    for broken in validate_links(&canonical, &outcome.index) {
        report.push(broken.to_report_item());
    }

    Ok(Analysis {
        canonical,
        discarded,
    })
}

fn summary(report: &ReportSet, canonical: usize, quiet: bool) {
    if quiet {
        return;
    }

    let collapsed = report
        .items
        .iter()
        .filter(|i| i.kind == Kind::Duplicate)
        .count();
    let errors = report.error_count();

    let status = if errors == 0 {
        "ok".green().bold().to_string()
    } else {
        format!("{} error(s)", errors).red().bold().to_string()
    };
    eprintln!(
        "{}: {} document(s), {} collapsed, {}",
        "faqc".bold(),
        canonical,
        collapsed,
        status
    );
}

/// Run the check pipeline (no output written)
pub fn run_check(root: &Path, opts: PipelineOptions) -> Result<PipelineOutcome> {
    let mut report = ReportSet::new();
    let analysis = analyze(root, opts, &mut report)?;

    for doc in &analysis.canonical {
        report.push(document_item(doc));
    }

    report.sort();
    summary(&report, analysis.canonical.len(), opts.quiet);

    Ok(PipelineOutcome {
        report,
        canonical: analysis.canonical,
    })
}

/// Run the full build pipeline, writing the site and manifest
pub fn run_build(root: &Path, out_dir: &Path, opts: PipelineOptions) -> Result<PipelineOutcome> {
    let mut report = ReportSet::new();
    let analysis = analyze(root, opts, &mut report)?;

    let written = html::write_site(out_dir, &analysis.canonical)?;
    report.extend(written.iter().map(|rel| ReportItem::output(rel.clone())));

    let manifest = Manifest::new(&analysis.canonical, analysis.discarded, opts.threshold);
    write_manifest(out_dir, &manifest)?;
    report.push(ReportItem::output(MANIFEST_FILE.to_string()));

    report.sort();
    summary(&report, analysis.canonical.len(), opts.quiet);

    Ok(PipelineOutcome {
        report,
        canonical: analysis.canonical,
    })
}

/// List the anchor index of the collapsed document set
pub fn run_anchor_list(
    root: &Path,
    doc_filter: Option<&str>,
    opts: PipelineOptions,
) -> Result<PipelineOutcome> {
    let mut report = ReportSet::new();
    let sources = scan_sources(root)?;
    let docs = load_documents(&sources, &mut report);

    let CollapseOutcome { canonical, .. } = collapse_documents(docs, opts.threshold);
    let outcome = AnchorIndex::build(&canonical);

    for (doc_id, err) in &outcome.failures {
        report.push(duplicate_anchor_item(doc_id, err));
    }

    let entries: Vec<_> = match doc_filter {
        Some(doc) => outcome.index.entries_for(doc).collect(),
        None => outcome.index.entries().collect(),
    };
    for entry in entries {
        report.push(
            ReportItem::anchor(entry.doc.clone(), entry.range)
                .with_excerpt(entry.heading.clone())
                .with_data(serde_json::json!({
                    "anchor": entry.anchor,
                    "explicit": entry.explicit,
                })),
        );
    }

    report.sort();
    Ok(PipelineOutcome { report, canonical })
}

/// Report duplicate groups without building
pub fn run_collapse(root: &Path, opts: PipelineOptions) -> Result<PipelineOutcome> {
    let mut report = ReportSet::new();
    let sources = scan_sources(root)?;
    let docs = load_documents(&sources, &mut report);

    let CollapseOutcome {
        canonical,
        discarded,
    } = collapse_documents(docs, opts.threshold);

    for doc in &canonical {
        let item = match sources.iter().find(|s| s.rel == doc.id) {
            Some(source) => source.to_report_item(),
            None => ReportItem::document(doc.id.clone()),
        };
        report.push(item.with_stage(Stage::Collapse));
    }
    for d in &discarded {
        report.push(d.to_report_item());
    }

    report.sort();
    summary(&report, canonical.len(), opts.quiet);

    Ok(PipelineOutcome { report, canonical })
}
