use crate::models::Book;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n]+").expect("valid line break regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static AUTHOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:by|author:)\s+([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)").expect("valid author regex")
});
static BOOK_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(pdf|epub|txt|md)$").expect("valid suffix regex"));

/// Collapse line-break runs, then every whitespace run, to one space
pub fn clean_text(text: &str) -> String {
    let text = LINE_BREAKS.replace_all(text, "\n");
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// First of the first ten lines that looks like a title, else the filename
/// without its document suffix
pub fn extract_title(filename: &str, content: &str) -> String {
    content
        .split('\n')
        .take(10)
        .find(|line| {
            let len = line.chars().count();
            len > 10 && len < 100 && !line.contains('©')
        })
        .map(|line| line.trim().to_string())
        .unwrap_or_else(|| BOOK_SUFFIX.replace(filename, "").into_owned())
}

pub fn extract_author(content: &str) -> String {
    AUTHOR_PATTERN
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Parse raw document text into a [`Book`] with a fresh id and timestamp
pub fn parse_book(filename: &str, content: &str) -> Book {
    let text = clean_text(content);

    Book {
        id: uuid::Uuid::new_v4().to_string(),
        filename: filename.to_string(),
        title: extract_title(filename, &text),
        author: extract_author(&text),
        word_count: text.split_whitespace().count(),
        content: text,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}
