use crate::constants::SUPPORTED_EXTENSIONS;
use crate::models::FileType;

/// Map a supported suffix to its file type
fn type_for_suffix(suffix: &str) -> FileType {
    match suffix {
        ".html" => FileType::Html,
        ".js" | ".jsx" => FileType::Javascript,
        ".py" => FileType::Python,
        ".ts" | ".tsx" => FileType::Typescript,
        ".css" => FileType::Css,
        ".json" => FileType::Json,
        ".md" => FileType::Markdown,
        _ => FileType::Unknown,
    }
}

/// First suffix in the ordered list that the filename ends with
fn matching_suffix(filename: &str) -> Option<&'static str> {
    let lower = filename.to_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .copied()
        .find(|suffix| lower.ends_with(suffix))
}

/// Detect the file type from the filename suffix
pub fn detect_file_type(filename: &str) -> FileType {
    matching_suffix(filename)
        .map(type_for_suffix)
        .unwrap_or(FileType::Unknown)
}

/// Check if the filename carries a supported catalog extension
pub fn is_valid(filename: &str) -> bool {
    matching_suffix(filename).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_file_type() {
        assert_eq!(detect_file_type("index.html"), FileType::Html);
        assert_eq!(detect_file_type("app.jsx"), FileType::Javascript);
        assert_eq!(detect_file_type("main.py"), FileType::Python);
        assert_eq!(detect_file_type("App.TSX"), FileType::Typescript);
        assert_eq!(detect_file_type("style.css"), FileType::Css);
        assert_eq!(detect_file_type("package.json"), FileType::Json);
        assert_eq!(detect_file_type("README.md"), FileType::Markdown);
        assert_eq!(detect_file_type("notes.txt"), FileType::Unknown);
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("games/snake.js"));
        assert!(is_valid("styles/site.css"));
        assert!(!is_valid("archive.zip"));
        assert!(!is_valid("binary.exe"));
        assert!(!is_valid("html"));
    }
}
