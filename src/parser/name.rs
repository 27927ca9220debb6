use crate::utils;
use once_cell::sync::Lazy;
use regex::Regex;

static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));
static H1_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("valid h1 regex"));
static CLASS_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bclass\s+([A-Z][A-Za-z0-9_]*)").expect("valid class regex"));
static FUNCTION_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bfunction\s+([A-Za-z_$][A-Za-z0-9_$]*)").expect("valid function regex")
});
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// Derive a display title for the file.
///
/// Tries, in order: `<title>`, `<h1>`, `class <Name>`, `function <name>`,
/// and finally the filename stem. The first candidate that is still
/// non-empty after sanitizing wins.
pub fn extract_name(filename: &str, content: &str) -> String {
    let candidates = [&*TITLE_TAG, &*H1_TAG, &*CLASS_DECL, &*FUNCTION_DECL]
        .into_iter()
        .filter_map(|re| re.captures(content))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()));

    for candidate in candidates {
        let name = sanitize_name(&candidate);
        if !name.is_empty() {
            return name;
        }
    }

    sanitize_name(&filename_stem(filename))
}

/// Filename without directories and without its last extension
fn filename_stem(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match base.rfind('.') {
        Some(idx) if idx > 0 => base[..idx].to_string(),
        _ => base.to_string(),
    }
}

/// Strip tags and decorative symbols, turn `-`/`_` into spaces, capitalize words
pub fn sanitize_name(raw: &str) -> String {
    let without_tags = HTML_TAG.replace_all(raw, " ");
    let cleaned: String = without_tags
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            c if c.is_alphanumeric() || c.is_whitespace() => c,
            '\'' | '.' | '&' | '+' => c,
            _ => ' ',
        })
        .collect();
    utils::capitalize_words(&cleaned)
}
