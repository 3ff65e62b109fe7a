//! Core module - Contains the fundamental data structures and utilities
//!
//! This module provides:
//! - Unified report model (ReportItem)
//! - Rendering functions for different report formats
//! - Path normalization utilities
//! - Common utilities
//! - File reading strategies

pub mod file_reader;
pub mod model;
pub mod paths;
pub mod render;
pub mod util;
