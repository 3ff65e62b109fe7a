//! Document parsing
//!
//! Splits Markdown into sections at headings, derives or extracts anchors,
//! and collects cross-references:
//!   ## How do I install? {#install}
//!   See [the build section](#build) or [the intro](general.md#intro).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::model::LineRange;
use crate::core::util::{hash_bytes, HashAlgorithm};

/// ATX heading with an optional explicit `{#id}` anchor
static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(#{1,6})\s+(.*?)\s*(?:\{#([A-Za-z0-9][A-Za-z0-9._-]*)\})?\s*$")
        .expect("Invalid HEADING_RE regex")
});

/// Inline Markdown link: [text](target)
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(([^)\s]+)\)").expect("Invalid LINK_RE regex"));

/// Fenced code block delimiter
static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(```+|~~~+)\s*([A-Za-z0-9_+-]*)\s*$").expect("Invalid FENCE_RE"));

/// A content block within a section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Block {
    /// Prose lines
    Text(Vec<String>),
    /// Fenced code sample
    Code { lang: String, lines: Vec<String> },
}

/// A heading-delimited section of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Heading text (empty for a preamble before the first heading)
    pub heading: String,

    /// Heading level, 1-6 (0 for a preamble)
    pub level: u8,

    /// Anchor ID; None only for a preamble section
    pub anchor: Option<String>,

    /// Whether the anchor was declared explicitly via `{#id}`
    pub explicit_anchor: bool,

    /// Line range covering the heading and body
    pub range: LineRange,

    /// Ordered content blocks
    pub blocks: Vec<Block>,
}

impl Section {
    /// Number of non-empty body lines across all blocks
    pub fn body_lines(&self) -> usize {
        self.blocks
            .iter()
            .map(|b| match b {
                Block::Text(lines) => lines.iter().filter(|l| !l.trim().is_empty()).count(),
                Block::Code { lines, .. } => lines.len(),
            })
            .sum()
    }
}

/// A cross-reference found in a document body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossRef {
    /// Source document id
    pub doc: String,

    /// 1-indexed source line
    pub line: u32,

    /// Target document id (None for a same-document reference)
    pub target_doc: Option<String>,

    /// Target anchor (None for a bare document link)
    pub anchor: Option<String>,

    /// The raw link target as written
    pub raw: String,
}

/// A parsed document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Normalized path relative to the input root; doubles as the id
    pub id: String,

    /// First H1 heading, if any
    pub title: Option<String>,

    /// Ordered sections
    pub sections: Vec<Section>,

    /// Cross-references found in section bodies
    pub refs: Vec<CrossRef>,

    /// XXH3 hash of the raw content
    pub hash: String,

    /// Modification time of the source (ms since epoch), for collapse ties
    pub mtime_ms: i64,
}

impl Document {
    /// Sections that declare an anchor (everything but a preamble)
    pub fn anchored_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.anchor.is_some())
    }

    /// Flattened text of the document (headings and bodies), used for
    /// similarity fingerprinting
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if !section.heading.is_empty() {
                out.push_str(&section.heading);
                out.push('\n');
            }
            for block in &section.blocks {
                let lines = match block {
                    Block::Text(lines) => lines,
                    Block::Code { lines, .. } => lines,
                };
                for line in lines {
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        out
    }
}

/// Derive an anchor slug from heading text.
///
/// Lowercases, keeps ASCII alphanumerics, collapses everything else into
/// single hyphens and trims them. `How do I *install*?` -> `how-do-i-install`.
pub fn slugify(heading: &str) -> String {
    let mut slug = String::with_capacity(heading.len());
    let mut pending_dash = false;

    for c in heading.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Resolve a link target path against the directory of the source document.
///
/// `faq/general.md` + `../intro.md` -> `intro.md`. Returns None when the
/// target escapes the input root.
fn resolve_target(doc_id: &str, target: &str) -> Option<String> {
    let mut parts: Vec<&str> = match doc_id.rfind('/') {
        Some(idx) => doc_id[..idx].split('/').collect(),
        None => Vec::new(),
    };

    for seg in target.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return None;
                }
            }
            _ => parts.push(seg),
        }
    }

    Some(parts.join("/"))
}

/// Whether a link target is external (URL scheme or mail address)
fn is_external(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}

/// Parse a link target into (target_doc, anchor) relative to the source doc.
///
/// Returns None for external links and non-document targets.
fn parse_ref(doc_id: &str, target: &str) -> Option<(Option<String>, Option<String>)> {
    if is_external(target) {
        return None;
    }

    // Anchor ids are lowercase on the declaration side; fold the
    // reference the same way so casing never breaks resolution
    if let Some(anchor) = target.strip_prefix('#') {
        if anchor.is_empty() {
            return None;
        }
        return Some((None, Some(anchor.to_lowercase())));
    }

    let (path, anchor) = match target.split_once('#') {
        Some((p, a)) => (p, Some(a.to_lowercase())),
        None => (target, None),
    };

    let lower = path.to_lowercase();
    if !(lower.ends_with(".md") || lower.ends_with(".markdown")) {
        // Images, stylesheets and other assets are not validated
        return None;
    }

    let resolved = resolve_target(doc_id, path)?;
    Some((Some(resolved), anchor))
}

/// Parse a document from its raw content
pub fn parse_content(content: &str, id: &str, mtime_ms: i64) -> Document {
    let hash = hash_bytes(content.as_bytes(), HashAlgorithm::Xxh3);
    let lines: Vec<&str> = content.lines().collect();

    let mut sections: Vec<Section> = Vec::new();
    let mut refs: Vec<CrossRef> = Vec::new();
    let mut title: Option<String> = None;

    // State for the section under construction
    let mut current: Option<Section> = None;
    let mut text_buf: Vec<String> = Vec::new();
    let mut code_buf: Vec<String> = Vec::new();
    let mut fence: Option<(String, String)> = None; // (delimiter, lang)

    fn flush_text(section: &mut Option<Section>, buf: &mut Vec<String>, line: u32) {
        if buf.is_empty() {
            return;
        }
        let sec = section.get_or_insert_with(|| Section {
            heading: String::new(),
            level: 0,
            anchor: None,
            explicit_anchor: false,
            range: LineRange::new(1, line),
            blocks: Vec::new(),
        });
        sec.blocks.push(Block::Text(std::mem::take(buf)));
    }

    for (idx, line) in lines.iter().enumerate() {
        let line_num = idx as u32 + 1;

        // Inside a fenced code block: accumulate until the closing fence
        if let Some((delim, lang)) = &fence {
            if let Some(caps) = FENCE_RE.captures(line) {
                if caps[1].starts_with(delim.chars().next().unwrap_or('`'))
                    && caps[1].len() >= delim.len()
                    && caps.get(2).map_or(true, |m| m.as_str().is_empty())
                {
                    let block = Block::Code {
                        lang: lang.clone(),
                        lines: std::mem::take(&mut code_buf),
                    };
                    flush_text(&mut current, &mut text_buf, line_num);
                    if let Some(sec) = current.as_mut() {
                        sec.blocks.push(block);
                        sec.range.end = line_num;
                    }
                    fence = None;
                    continue;
                }
            }
            code_buf.push(line.to_string());
            continue;
        }

        if let Some(caps) = FENCE_RE.captures(line) {
            flush_text(&mut current, &mut text_buf, line_num);
            fence = Some((
                caps[1].to_string(),
                caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
            ));
            continue;
        }

        if let Some(caps) = HEADING_RE.captures(line) {
            // Close the previous section
            flush_text(&mut current, &mut text_buf, line_num.saturating_sub(1));
            if let Some(mut sec) = current.take() {
                sec.range.end = line_num - 1;
                sections.push(sec);
            }

            let level = caps[1].len() as u8;
            let heading = caps[2].trim().to_string();
            let explicit = caps.get(3).is_some();
            let anchor = caps
                .get(3)
                .map(|m| m.as_str().to_lowercase())
                .unwrap_or_else(|| slugify(&heading));

            if level == 1 && title.is_none() {
                title = Some(heading.clone());
            }

            current = Some(Section {
                heading,
                level,
                anchor: if anchor.is_empty() { None } else { Some(anchor) },
                explicit_anchor: explicit,
                range: LineRange::new(line_num, line_num),
                blocks: Vec::new(),
            });
            continue;
        }

        // Plain body line: collect refs, accumulate text
        for caps in LINK_RE.captures_iter(line) {
            let target = caps[2].to_string();
            if let Some((target_doc, anchor)) = parse_ref(id, &target) {
                refs.push(CrossRef {
                    doc: id.to_string(),
                    line: line_num,
                    target_doc,
                    anchor,
                    raw: target,
                });
            }
        }

        text_buf.push(line.to_string());
        if let Some(sec) = current.as_mut() {
            sec.range.end = line_num;
        }
    }

    // An unterminated fence still counts as a code block
    if let Some((_, lang)) = fence.take() {
        flush_text(&mut current, &mut text_buf, lines.len() as u32);
        if let Some(sec) = current.as_mut() {
            sec.blocks.push(Block::Code {
                lang,
                lines: std::mem::take(&mut code_buf),
            });
        }
    }

    flush_text(&mut current, &mut text_buf, lines.len() as u32);
    if let Some(mut sec) = current.take() {
        sec.range.end = lines.len() as u32;
        sections.push(sec);
    }

    Document {
        id: id.to_string(),
        title,
        sections,
        refs,
        hash,
        mtime_ms,
    }
}
