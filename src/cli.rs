//! CLI module - Command-line interface definitions and handlers

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::build::pipeline::{self, PipelineOptions};
use crate::collapse::merge::DEFAULT_THRESHOLD;
use crate::core::render::{OutputFormat, RenderConfig, Renderer};

/// faqc - compile a directory of Markdown FAQ documents into a static HTML site.
#[derive(Parser, Debug)]
#[command(name = "faqc")]
#[command(
    author,
    version,
    about,
    long_about = r#"faqc emits a unified, machine-readable report for every command.

Each command prints a ReportSet in the selected format (default: jsonl) and
exits with code 1 when validation errors (duplicate anchors, broken
cross-references) are found.

Output formats:
- jsonl: one JSON object per line (best for piping into tools)
- json: a single JSON array
- md: human-friendly Markdown
- raw: excerpts only (unstable; intended for debugging)

Examples:
    faqc build docs/ site/
    faqc check docs/
    faqc anchor list docs/ --doc install.md
    faqc collapse docs/ --threshold 0.85
"#
)]
pub struct Cli {
    /// Output format (jsonl/json/md/raw).
    #[arg(
        long,
        global = true,
        default_value = "jsonl",
        value_name = "FORMAT",
        long_help = "Select the output format for the ReportSet.\n\n\
Supported values:\n\
- jsonl (default)\n\
- json\n\
- md (markdown)\n\
- raw\n\n\
Tip: Prefer jsonl when you want stable, line-oriented output for piping."
    )]
    pub format: String,

    /// Disable colored output (when applicable).
    #[arg(
        long,
        global = true,
        long_help = "Disable colored output. This is useful when piping to files or when your\n\
terminal does not support ANSI colors."
    )]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Reduce non-essential output. Machine-readable reports are still printed\n\
to stdout; the stderr summary line is suppressed."
    )]
    pub quiet: bool,

    /// Verbose mode (more diagnostics).
    #[arg(
        short,
        long,
        global = true,
        long_help = "Enable more detailed diagnostics. This is intended for debugging and\n\
may increase stderr output."
    )]
    pub verbose: bool,

    /// Pretty-print JSON/JSONL output with indentation.
    #[arg(
        long,
        global = true,
        long_help = "Pretty-print JSON and JSONL output with indentation for human readability.\n\n\
This is useful when manually inspecting reports. Has no effect on md/raw formats."
    )]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the collection: validate, render HTML, write the manifest.
    #[command(
        long_about = "Run the full pipeline over INPUT and write the rendered site to OUTPUT.\n\n\
Sources are scanned, parsed, collapsed, indexed and validated; surviving\n\
canonical documents are rendered to one HTML page each plus an index page\n\
and a manifest.json. Stale .html files from earlier builds are removed.\n\n\
Exits 1 when duplicate anchors or broken cross-references are found; the\n\
site for valid documents is still written.\n\n\
Examples:\n\
  faqc build docs/ site/\n\
  faqc build docs/ site/ --threshold 0.85\n"
    )]
    Build {
        /// Input directory containing Markdown sources.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output directory for the rendered site.
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,

        /// Similarity threshold for duplicate collapsing (0.0 to 1.0).
        #[arg(
            long,
            value_name = "T",
            default_value_t = DEFAULT_THRESHOLD,
            long_help = "Similarity threshold above which two documents are considered\n\
near-duplicates and collapsed into one canonical copy.\n\n\
Grouping is transitive. Use 1.0 to collapse only exact matches."
        )]
        threshold: f64,
    },

    /// Validate the collection without writing any output.
    #[command(
        long_about = "Run the pipeline over INPUT without the render stage.\n\n\
Reports canonical documents, collapsed duplicates, duplicate anchors and\n\
broken cross-references. Exits 1 when validation errors are found.\n\n\
Examples:\n\
  faqc check docs/\n\
  faqc check docs/ --format md\n"
    )]
    Check {
        /// Input directory containing Markdown sources.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Similarity threshold for duplicate collapsing (0.0 to 1.0).
        #[arg(long, value_name = "T", default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },

    /// Anchor index operations.
    Anchor {
        #[command(subcommand)]
        action: AnchorCommands,
    },

    /// Report near-duplicate groups without building.
    #[command(
        long_about = "Collapse near-duplicate documents and report the result without\n\
building. One ReportItem per canonical document plus one per discarded\n\
copy, naming its canonical replacement and the similarity score.\n\n\
Examples:\n\
  faqc collapse docs/\n\
  faqc collapse docs/ --threshold 0.85\n"
    )]
    Collapse {
        /// Input directory containing Markdown sources.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Similarity threshold for duplicate collapsing (0.0 to 1.0).
        #[arg(long, value_name = "T", default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
    },
}

#[derive(Subcommand, Debug)]
pub enum AnchorCommands {
    /// List the anchor index of the collapsed collection.
    #[command(
        long_about = "List every anchor of the collapsed document set, one ReportItem per\n\
anchor with its heading text and whether the id was written explicitly.\n\n\
Examples:\n\
  faqc anchor list docs/\n\
  faqc anchor list docs/ --doc install.md\n"
    )]
    List {
        /// Input directory containing Markdown sources.
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Only list anchors of this document (path relative to INPUT).
        #[arg(long, value_name = "DOC")]
        doc: Option<String>,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    // Parse output format
    let format: OutputFormat = cli.format.parse().unwrap_or_default();
    let render_config = RenderConfig::with_pretty(format, cli.pretty);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let outcome = match cli.command {
        Commands::Build {
            input,
            output,
            threshold,
        } => {
            let input = input.canonicalize().unwrap_or(input);
            if cli.verbose && !cli.quiet {
                eprintln!("building {} -> {}", input.display(), output.display());
            }
            pipeline::run_build(
                &input,
                &output,
                PipelineOptions {
                    threshold,
                    quiet: cli.quiet,
                },
            )?
        }

        Commands::Check { input, threshold } => {
            let input = input.canonicalize().unwrap_or(input);
            pipeline::run_check(
                &input,
                PipelineOptions {
                    threshold,
                    quiet: cli.quiet,
                },
            )?
        }

        Commands::Anchor { action } => match action {
            AnchorCommands::List { input, doc } => {
                let input = input.canonicalize().unwrap_or(input);
                pipeline::run_anchor_list(
                    &input,
                    doc.as_deref(),
                    PipelineOptions {
                        threshold: DEFAULT_THRESHOLD,
                        quiet: cli.quiet,
                    },
                )?
            }
        },

        Commands::Collapse { input, threshold } => {
            let input = input.canonicalize().unwrap_or(input);
            pipeline::run_collapse(
                &input,
                PipelineOptions {
                    threshold,
                    quiet: cli.quiet,
                },
            )?
        }
    };

    let renderer = Renderer::with_config(render_config);
    let mut rendered = renderer.render(&outcome.report);
    if !rendered.is_empty() {
        if !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        print!("{}", rendered);
        io::stdout().flush()?;
    }

    if outcome.failed() {
        std::process::exit(1);
    }
    Ok(())
}
