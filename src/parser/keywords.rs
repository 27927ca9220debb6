/// Vocabulary terms contained in `content`, case-insensitive, in vocabulary order.
/// Presence only: each term appears at most once.
pub fn extract_keywords(content: &str, vocabulary: &[String]) -> Vec<String> {
    let lower = content.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();

    for term in vocabulary {
        let term_lower = term.to_lowercase();
        if !term_lower.is_empty() && lower.contains(&term_lower) && !keywords.contains(&term_lower) {
            keywords.push(term_lower);
        }
    }

    keywords
}
