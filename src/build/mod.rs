//! Build module - The pipeline and its output surfaces
//!
//! Provides:
//! - scan: Markdown source discovery (gitignore-aware)
//! - html: deterministic HTML emission
//! - manifest: build manifest written next to the rendered site
//! - pipeline: the build/check flow wiring all stages together

pub mod html;
pub mod manifest;
pub mod pipeline;
pub mod scan;
