//! Docs module - Parse, index and validate document collections
//!
//! A document is ordinary Markdown split into heading-delimited sections.
//! Every heading gets an anchor: either explicit (`## Title {#custom-id}`)
//! or a slug derived from the heading text.

pub mod index;
pub mod links;
pub mod parse;
