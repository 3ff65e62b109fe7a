//! Unified file reading strategies
//!
//! Document sources must be read whole (a truncated source would corrupt the
//! build), so oversized files are skipped rather than clipped. Provides
//! consistent handling for:
//! - Non-UTF-8 files
//! - Oversized files
//! - Binary files
//! - Unreadable files (reported with error severity)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::model::{Issue, ReportItem, Severity};

/// Default maximum source size in bytes (8 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 8 * 1024 * 1024;

/// Strategy for handling non-UTF-8 content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingStrategy {
    /// Skip non-UTF-8 files entirely
    Skip,
    /// Use lossy conversion (replace invalid bytes)
    #[default]
    Lossy,
}

/// Configuration for file reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReadConfig {
    /// Maximum source size to process (bytes)
    pub max_file_size: u64,

    /// How to handle non-UTF-8 content
    pub encoding_strategy: EncodingStrategy,
}

impl Default for FileReadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            encoding_strategy: EncodingStrategy::Lossy,
        }
    }
}

/// Warning codes for file operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningCode {
    /// File was skipped due to size
    FileSkippedSize,
    /// File was skipped due to encoding
    FileSkippedEncoding,
    /// Lossy encoding conversion used
    LossyConversion,
    /// File appears to be binary
    BinaryFile,
    /// File could not be read at all (I/O error)
    ReadFailed,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::FileSkippedSize => "FILE_SKIPPED_SIZE",
            WarningCode::FileSkippedEncoding => "FILE_SKIPPED_ENCODING",
            WarningCode::LossyConversion => "LOSSY_CONVERSION",
            WarningCode::BinaryFile => "BINARY_FILE",
            WarningCode::ReadFailed => "READ_FAILED",
        }
    }

    /// Skipped and converted files are tolerable; a file that exists but
    /// cannot be read is not.
    pub fn severity(&self) -> Severity {
        match self {
            WarningCode::ReadFailed => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// A structured warning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileWarning {
    pub code: WarningCode,
    pub message: String,

    /// Associated file path (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl FileWarning {
    pub fn new(code: WarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Convert to a ReportItem; severity follows the warning code
    pub fn to_report_item(&self) -> ReportItem {
        let mut item = ReportItem::error(Issue::new(self.code.as_str(), &self.message))
            .with_severity(self.code.severity());
        item.path = self.path.clone();
        item
    }
}

/// Result of reading a source file
#[derive(Debug, Clone)]
pub struct FileReadResult {
    /// The file content (if successfully read)
    pub content: Option<String>,

    /// Whether lossy conversion was used
    pub lossy_conversion: bool,

    /// Warnings generated during reading
    pub warnings: Vec<FileWarning>,

    /// Whether the file was skipped
    pub skipped: bool,

    /// Reason for skipping (if skipped)
    pub skip_reason: Option<String>,
}

impl FileReadResult {
    fn success(content: String) -> Self {
        Self {
            content: Some(content),
            lossy_conversion: false,
            warnings: Vec::new(),
            skipped: false,
            skip_reason: None,
        }
    }

    fn skipped(reason: impl Into<String>) -> Self {
        Self {
            content: None,
            lossy_conversion: false,
            warnings: Vec::new(),
            skipped: true,
            skip_reason: Some(reason.into()),
        }
    }

    fn with_lossy(mut self) -> Self {
        self.lossy_conversion = true;
        self
    }

    fn with_warning(mut self, warning: FileWarning) -> Self {
        self.warnings.push(warning);
        self
    }
}

/// Read a source file with the given configuration
pub fn read_file_with_config(path: &Path, config: &FileReadConfig) -> FileReadResult {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) => {
            let message = format!("Cannot read metadata: {}", e);
            let warning = FileWarning::new(WarningCode::ReadFailed, &message)
                .with_path(path.display().to_string());
            return FileReadResult::skipped(message).with_warning(warning);
        }
    };

    let file_size = metadata.len();
    if file_size > config.max_file_size {
        let warning = FileWarning::new(
            WarningCode::FileSkippedSize,
            format!(
                "File exceeds size limit ({} > {} bytes)",
                file_size, config.max_file_size
            ),
        )
        .with_path(path.display().to_string());
        return FileReadResult::skipped(format!(
            "File size {} exceeds limit {}",
            file_size, config.max_file_size
        ))
        .with_warning(warning);
    }

    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            let message = format!("Cannot read file: {}", e);
            let warning = FileWarning::new(WarningCode::ReadFailed, &message)
                .with_path(path.display().to_string());
            return FileReadResult::skipped(message).with_warning(warning);
        }
    };

    // Binary check: null bytes in the first 8KB
    let check_len = std::cmp::min(8192, bytes.len());
    if bytes[..check_len].contains(&0) {
        let warning = FileWarning::new(
            WarningCode::BinaryFile,
            "File appears to be binary (contains null bytes)",
        )
        .with_path(path.display().to_string());
        return FileReadResult::skipped("Binary file").with_warning(warning);
    }

    match String::from_utf8(bytes) {
        Ok(content) => FileReadResult::success(content),
        Err(e) => match config.encoding_strategy {
            EncodingStrategy::Skip => {
                let warning = FileWarning::new(
                    WarningCode::FileSkippedEncoding,
                    "File contains invalid UTF-8 sequences",
                )
                .with_path(path.display().to_string());
                FileReadResult::skipped("Invalid UTF-8").with_warning(warning)
            }
            EncodingStrategy::Lossy => {
                let content = String::from_utf8_lossy(e.as_bytes()).into_owned();
                let warning = FileWarning::new(
                    WarningCode::LossyConversion,
                    "Lossy UTF-8 conversion applied (some characters replaced)",
                )
                .with_path(path.display().to_string());
                FileReadResult::success(content)
                    .with_lossy()
                    .with_warning(warning)
            }
        },
    }
}

/// Convenience function with default config
pub fn read_file_safe(path: &Path) -> FileReadResult {
    read_file_with_config(path, &FileReadConfig::default())
}
