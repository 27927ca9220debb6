use blake3;

/// Compute Blake3 hash of text content
pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Get file extension from a filename (without the dot, lowercased)
pub fn get_extension(filename: &str) -> Option<String> {
    std::path::Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|s| s.to_lowercase())
}

/// Take at most `max_chars` characters from the start of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Slice of `text` spanning `radius` characters on each side of `byte_idx`.
/// `byte_idx` must lie on a char boundary.
pub fn char_window(text: &str, byte_idx: usize, radius: usize) -> &str {
    if radius == 0 {
        return &text[byte_idx..byte_idx];
    }
    let start = text[..byte_idx]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let end = text[byte_idx..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| byte_idx + i)
        .unwrap_or(text.len());

    &text[start..end]
}

/// Uppercase the first letter of every whitespace-separated word
pub fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Push `value` unless an equal entry is already present
pub fn push_unique(items: &mut Vec<String>, value: impl Into<String>) {
    let value = value.into();
    if !items.contains(&value) {
        items.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_consistent() {
        let hash1 = content_hash("same content");
        let hash2 = content_hash("same content");
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_content_hash_different_content() {
        assert_ne!(content_hash("content one"), content_hash("content two"));
    }

    #[test]
    fn test_get_extension_lowercase() {
        assert_eq!(get_extension("game.HTML"), Some("html".to_string()));
    }

    #[test]
    fn test_get_extension_no_extension() {
        assert_eq!(get_extension("Makefile"), None);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_char_window() {
        let text = "0123456789";
        assert_eq!(char_window(text, 5, 2), "3456");
        assert_eq!(char_window(text, 1, 3), "0123");
        assert_eq!(char_window(text, 8, 5), "3456789");
        assert_eq!(char_window(text, 4, 0), "");
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("particle  galaxy demo"), "Particle Galaxy Demo");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn test_push_unique() {
        let mut items = vec!["game".to_string()];
        push_unique(&mut items, "game");
        push_unique(&mut items, "arcade");
        assert_eq!(items, vec!["game", "arcade"]);
    }
}
