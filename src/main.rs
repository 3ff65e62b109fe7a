//! faqc - Compile Markdown FAQ collections into static HTML
//!
//! faqc provides:
//! - Gitignore-aware discovery of Markdown sources
//! - Anchor indexing with duplicate detection
//! - Near-duplicate document collapsing
//! - Cross-reference validation
//! - Deterministic HTML rendering with a build manifest

use anyhow::Result;
use clap::Parser;

mod build;
mod cli;
mod collapse;
mod core;
mod docs;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::run(cli)
}
