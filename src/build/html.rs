//! HTML emission
//!
//! A deterministic mapping from the canonical document set to static HTML.
//! Rendering functions are pure; `write_site` is the only writer and also
//! sweeps stale .html files out of the output directory so repeated builds
//! stay byte-identical with the input.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::core::paths::{is_hidden, output_path};
use crate::docs::parse::{Block, Document};

/// Inline Markdown link, same shape the parser matches
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]+)\)").expect("Invalid LINK_RE regex"));

/// Inline code span
static CODE_SPAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`([^`]+)`").expect("Invalid CODE_SPAN_RE regex"));

/// Escape HTML-special characters
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Rewrite a link target for the rendered site: Markdown extensions become
/// .html and anchors are folded to the lowercase ids the pages emit.
/// External targets pass through untouched.
fn rewrite_target(target: &str) -> String {
    if target.contains("://") || target.starts_with("mailto:") {
        return target.to_string();
    }
    if let Some(anchor) = target.strip_prefix('#') {
        return format!("#{}", anchor.to_lowercase());
    }
    match target.split_once('#') {
        Some((path, anchor)) => format!("{}#{}", output_path(path), anchor.to_lowercase()),
        None => output_path(target),
    }
}

/// Render one body line: escape, then convert links and code spans
fn render_inline(line: &str) -> String {
    let mut out = String::new();
    let mut last = 0;

    for caps in LINK_RE.captures_iter(line) {
        let m = caps.get(0).unwrap();
        out.push_str(&escape_html(&line[last..m.start()]));
        out.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            escape_html(&rewrite_target(&caps[2])),
            escape_html(&caps[1]),
        ));
        last = m.end();
    }
    out.push_str(&escape_html(&line[last..]));

    CODE_SPAN_RE
        .replace_all(&out, "<code>$1</code>")
        .into_owned()
}

/// Render a text block as paragraphs split on blank lines
fn render_text(out: &mut String, lines: &[String]) {
    let mut paragraph: Vec<String> = Vec::new();

    let mut flush = |paragraph: &mut Vec<String>, out: &mut String| {
        if paragraph.is_empty() {
            return;
        }
        out.push_str("<p>");
        out.push_str(&paragraph.join("\n"));
        out.push_str("</p>\n");
        paragraph.clear();
    };

    for line in lines {
        if line.trim().is_empty() {
            flush(&mut paragraph, out);
        } else {
            paragraph.push(render_inline(line));
        }
    }
    flush(&mut paragraph, out);
}

/// Render a full document page
pub fn render_document(doc: &Document) -> String {
    let title = doc.title.clone().unwrap_or_else(|| doc.id.clone());

    let mut body = String::new();
    for section in &doc.sections {
        if !section.heading.is_empty() {
            let level = section.level.clamp(1, 6);
            match &section.anchor {
                Some(anchor) => body.push_str(&format!(
                    "<h{level} id=\"{}\">{}</h{level}>\n",
                    escape_html(anchor),
                    escape_html(&section.heading),
                )),
                None => body.push_str(&format!(
                    "<h{level}>{}</h{level}>\n",
                    escape_html(&section.heading),
                )),
            }
        }

        for block in &section.blocks {
            match block {
                Block::Text(lines) => render_text(&mut body, lines),
                Block::Code { lang, lines } => {
                    if lang.is_empty() {
                        body.push_str("<pre><code>");
                    } else {
                        body.push_str(&format!(
                            "<pre><code class=\"language-{}\">",
                            escape_html(lang)
                        ));
                    }
                    body.push_str(&escape_html(&lines.join("\n")));
                    body.push_str("</code></pre>\n");
                }
            }
        }
    }

    page(&title, &body)
}

/// Render the site index page listing all canonical documents
pub fn render_index(docs: &[Document]) -> String {
    let mut sorted: Vec<&Document> = docs.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut body = String::from("<h1>Documents</h1>\n<ul>\n");
    for doc in sorted {
        let label = doc.title.clone().unwrap_or_else(|| doc.id.clone());
        body.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(&output_path(&doc.id)),
            escape_html(&label),
        ));
    }
    body.push_str("</ul>\n");

    page("Index", &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(title),
        body
    )
}

/// Write the rendered site into `out_dir`, replacing whatever is there.
///
/// Returns the relative paths written, sorted. Stale .html files left over
/// from previous builds are removed; other files are untouched.
pub fn write_site(out_dir: &Path, docs: &[Document]) -> Result<Vec<String>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut written: BTreeSet<String> = BTreeSet::new();

    for doc in docs {
        let rel = output_path(&doc.id);
        let target = out_dir.join(&rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, render_document(doc))
            .with_context(|| format!("Failed to write {}", target.display()))?;
        written.insert(rel);
    }

    fs::write(out_dir.join("index.html"), render_index(docs))
        .with_context(|| format!("Failed to write {}", out_dir.join("index.html").display()))?;
    written.insert("index.html".to_string());

    // Sweep stale pages from earlier builds, leaving hidden trees alone
    for entry in WalkDir::new(out_dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("html") {
            continue;
        }
        let rel = match path.strip_prefix(out_dir) {
            Ok(r) => r.to_string_lossy().replace('\\', "/"),
            Err(_) => continue,
        };
        if !written.contains(&rel) {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove stale {}", path.display()))?;
        }
    }

    Ok(written.into_iter().collect())
}
