//! Report renderer
//!
//! Renders a ReportSet to different output formats: jsonl, json, md, raw.
//! This is the renderer for command reports; HTML emission for the site
//! itself lives in `build::html`.

use crate::core::model::{Kind, ReportItem, ReportSet};
use std::io::Write;

/// Report output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Json,
    Markdown,
    Raw,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "json" => Ok(OutputFormat::Json),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "raw" => Ok(OutputFormat::Raw),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Render configuration combining format and options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub pretty: bool,
}

impl RenderConfig {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            pretty: false,
        }
    }

    pub fn with_pretty(format: OutputFormat, pretty: bool) -> Self {
        Self { format, pretty }
    }
}

/// Renderer for report sets
pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            config: RenderConfig::new(format),
        }
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Render a report set to a string
    pub fn render(&self, report: &ReportSet) -> String {
        match self.config.format {
            OutputFormat::Jsonl => self.render_jsonl(report),
            OutputFormat::Json => self.render_json(report),
            OutputFormat::Markdown => self.render_markdown(report),
            OutputFormat::Raw => self.render_raw(report),
        }
    }

    /// Render to a writer
    pub fn render_to<W: Write>(&self, report: &ReportSet, mut writer: W) -> std::io::Result<()> {
        let output = self.render(report);
        writer.write_all(output.as_bytes())
    }

    /// Render as JSON Lines (one JSON object per line)
    fn render_jsonl(&self, report: &ReportSet) -> String {
        report
            .items
            .iter()
            .filter_map(|item| {
                if self.config.pretty {
                    serde_json::to_string_pretty(item).ok()
                } else {
                    serde_json::to_string(item).ok()
                }
            })
            .collect::<Vec<_>>()
            .join(if self.config.pretty { "\n\n" } else { "\n" })
    }

    /// Render as a single JSON array
    fn render_json(&self, report: &ReportSet) -> String {
        if self.config.pretty {
            serde_json::to_string_pretty(&report.items).unwrap_or_else(|_| "[]".to_string())
        } else {
            serde_json::to_string(&report.items).unwrap_or_else(|_| "[]".to_string())
        }
    }

    /// Render as Markdown
    fn render_markdown(&self, report: &ReportSet) -> String {
        let mut output = String::new();

        // Group by kind
        let mut documents = Vec::new();
        let mut anchors = Vec::new();
        let mut links = Vec::new();
        let mut duplicates = Vec::new();
        let mut outputs = Vec::new();
        let mut errors = Vec::new();

        for item in &report.items {
            match item.kind {
                Kind::Document => documents.push(item),
                Kind::Anchor => anchors.push(item),
                Kind::Link => links.push(item),
                Kind::Duplicate => duplicates.push(item),
                Kind::Output => outputs.push(item),
                Kind::Error => errors.push(item),
            }
        }

        if !errors.is_empty() {
            output.push_str("## Errors\n\n");
            for item in errors {
                for issue in &item.issues {
                    output.push_str(&format!("- **{}**: {}\n", issue.code, issue.message));
                }
            }
            output.push('\n');
        }

        if !links.is_empty() {
            output.push_str("## Broken Links\n\n");
            for item in links {
                self.render_item_md(&mut output, item);
            }
            output.push('\n');
        }

        if !duplicates.is_empty() {
            output.push_str("## Collapsed Duplicates\n\n");
            for item in duplicates {
                if let Some(path) = &item.path {
                    output.push_str(&format!("- `{}`", path));
                    if let Some(canonical) =
                        item.data.as_ref().and_then(|d| d.get("canonical")).and_then(|c| c.as_str())
                    {
                        output.push_str(&format!(" → `{}`", canonical));
                    }
                    output.push('\n');
                }
            }
            output.push('\n');
        }

        if !documents.is_empty() {
            output.push_str("## Documents\n\n");
            for item in documents {
                if let Some(path) = &item.path {
                    output.push_str(&format!("- `{}`", path));
                    if let Some(size) = item.meta.size {
                        output.push_str(&format!(" ({} bytes)", size));
                    }
                    output.push('\n');
                }
            }
            output.push('\n');
        }

        if !anchors.is_empty() {
            output.push_str("## Anchors\n\n");
            for item in anchors {
                self.render_item_md(&mut output, item);
            }
            output.push('\n');
        }

        if !outputs.is_empty() {
            output.push_str("## Rendered\n\n");
            for item in outputs {
                if let Some(path) = &item.path {
                    output.push_str(&format!("- `{}`\n", path));
                }
            }
            output.push('\n');
        }

        output
    }

    fn render_item_md(&self, output: &mut String, item: &ReportItem) {
        if let Some(path) = &item.path {
            output.push_str(&format!("### `{}`", path));
            if let Some(range) = &item.range {
                output.push_str(&format!(" (lines {}-{})", range.start, range.end));
            }
            output.push('\n');
        }

        for issue in &item.issues {
            output.push_str(&format!("\n- **{}**: {}\n", issue.code, issue.message));
        }

        if let Some(excerpt) = &item.excerpt {
            output.push_str("\n```\n");
            output.push_str(excerpt);
            if !excerpt.ends_with('\n') {
                output.push('\n');
            }
            output.push_str("```\n");
        }

        if item.meta.truncated {
            output.push_str("\n> Content was truncated\n");
        }

        output.push('\n');
    }

    /// Render as raw output (for debugging)
    fn render_raw(&self, report: &ReportSet) -> String {
        // Raw mode: just output excerpts directly
        report
            .items
            .iter()
            .filter_map(|item| item.excerpt.clone())
            .collect::<Vec<_>>()
            .join("\n---\n")
    }
}
