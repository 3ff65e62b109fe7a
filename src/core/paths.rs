//! Path normalization utilities
//!
//! Ensures all paths are normalized to use '/' as separator and are relative
//! to the input root, and maps source paths to their rendered counterparts.

use std::path::Path;

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the input root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(|p| normalize_path(p))
}

/// Check if a path is hidden (starts with '.')
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Check if a relative path points at a Markdown source
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            e == "md" || e == "markdown"
        })
        .unwrap_or(false)
}

/// Map a normalized source path to its rendered output path.
///
/// `faq/general.md` becomes `faq/general.html`; non-Markdown paths are
/// returned unchanged.
pub fn output_path(source: &str) -> String {
    let lower = source.to_lowercase();
    if let Some(stem) = lower
        .strip_suffix(".markdown")
        .map(|_| &source[..source.len() - ".markdown".len()])
    {
        return format!("{}.html", stem);
    }
    if lower.ends_with(".md") {
        return format!("{}.html", &source[..source.len() - ".md".len()]);
    }
    source.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_normalize_path() {
        let path = Path::new("faq/general.md");
        assert_eq!(normalize_path(path), "faq/general.md");
    }

    #[test]
    fn test_make_relative() {
        let root = Path::new("/project");
        let path = Path::new("/project/faq/general.md");
        assert_eq!(
            make_relative(path, root),
            Some("faq/general.md".to_string())
        );
    }

    #[test]
    fn test_make_relative_not_under_root() {
        let root = Path::new("/project");
        let path = Path::new("/other/file.md");
        assert_eq!(make_relative(path, root), None);
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new(".git")));
        assert!(is_hidden(Path::new(".gitignore")));
        assert!(!is_hidden(Path::new("faq")));
        assert!(!is_hidden(Path::new("general.md")));
    }

    #[test]
    fn test_is_markdown() {
        assert!(is_markdown(Path::new("faq.md")));
        assert!(is_markdown(Path::new("faq.MD")));
        assert!(is_markdown(Path::new("faq.markdown")));
        assert!(!is_markdown(Path::new("faq.txt")));
        assert!(!is_markdown(Path::new("faq")));
    }

    #[test]
    fn test_output_path() {
        assert_eq!(output_path("faq/general.md"), "faq/general.html");
        assert_eq!(output_path("notes.markdown"), "notes.html");
        assert_eq!(output_path("style.css"), "style.css");
    }
}
