use crate::models::TextChunk;

/// Split `text` into consecutive groups of at most `max_words` words.
///
/// Words are rejoined with single spaces, so joining the chunk texts with a
/// space yields the whitespace-normalized input. Blank input gives no chunks.
pub fn split_into_chunks(text: &str, max_words: usize) -> Vec<TextChunk> {
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(max_words.max(1))
        .enumerate()
        .map(|(index, group)| TextChunk {
            index,
            text: group.join(" "),
            word_count: group.len(),
        })
        .collect()
}
