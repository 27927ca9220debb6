pub mod book;
pub mod chunk;
pub mod heuristic;
pub mod prompt;
pub mod schema;

pub use book::parse_book;
pub use chunk::split_into_chunks;
pub use heuristic::{extract_concepts, quick_extraction, InsightVocabulary};
pub use prompt::{build_extraction_prompt, ExtractionOptions};
pub use schema::validate_insights;

use crate::constants::{CHUNK_WORDS, EXTRACTION_MAX_TOKENS};
use crate::gateway::{json, CompletionParams, CompletionProvider, GatewayError};
use crate::models::{Book, Insight, TextChunk};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Default sampling temperature for extraction requests
pub const EXTRACTION_TEMPERATURE: f32 = 0.2;

/// Which extraction path produced a batch of insights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    Ai,
    Heuristic,
}

/// Pulls insights out of books, through the inference service when it is
/// reachable and by pattern matching otherwise
pub struct InsightExtractor {
    gateway: Option<Arc<dyn CompletionProvider>>,
    vocabulary: InsightVocabulary,
    chunk_words: usize,
    temperature: f32,
}

impl Default for InsightExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightExtractor {
    pub fn new() -> Self {
        Self {
            gateway: None,
            vocabulary: InsightVocabulary::default(),
            chunk_words: CHUNK_WORDS,
            temperature: EXTRACTION_TEMPERATURE,
        }
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn CompletionProvider>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: InsightVocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_chunk_words(mut self, chunk_words: usize) -> Self {
        self.chunk_words = chunk_words.max(1);
        self
    }

    pub fn vocabulary(&self) -> &InsightVocabulary {
        &self.vocabulary
    }

    /// Chunks the AI path would send for `book`
    pub fn chunks(&self, book: &Book) -> Vec<TextChunk> {
        split_into_chunks(&book.content, self.chunk_words)
    }

    /// Pattern-based extraction over the whole book, stamped with provenance
    pub fn extract_heuristic(&self, book: &Book) -> Vec<Insight> {
        quick_extraction(&book.content, &self.vocabulary)
            .into_iter()
            .map(|insight| insight.stamped(book))
            .collect()
    }

    pub async fn extract_ai(&self, book: &Book, options: ExtractionOptions) -> Vec<Insight> {
        self.extract_ai_with_progress(book, options, |_, _| {}).await
    }

    /// AI extraction chunk by chunk, calling `on_chunk(done, total)` after each.
    ///
    /// A failing chunk contributes nothing; the batch always runs to the end.
    pub async fn extract_ai_with_progress<F>(&self, book: &Book, options: ExtractionOptions, mut on_chunk: F) -> Vec<Insight>
    where
        F: FnMut(usize, usize),
    {
        let Some(gateway) = &self.gateway else {
            warn!("No inference service configured, AI extraction skipped for {}", book.title);
            return Vec::new();
        };

        let chunks = self.chunks(book);
        let total = chunks.len();
        let mut insights = Vec::new();

        for chunk in &chunks {
            match self.extract_chunk(gateway.as_ref(), chunk, options).await {
                Ok(found) => {
                    debug!("Chunk {}/{} yielded {} insights", chunk.index + 1, total, found.len());
                    insights.extend(found.into_iter().map(|insight| insight.stamped(book)));
                }
                Err(e) => warn!("Failed to extract from chunk {}/{}: {}", chunk.index + 1, total, e),
            }
            on_chunk(chunk.index + 1, total);
        }

        info!("Extracted {} insights from {} chunks of {}", insights.len(), total, book.title);
        insights
    }

    async fn extract_chunk(
        &self,
        gateway: &dyn CompletionProvider,
        chunk: &TextChunk,
        options: ExtractionOptions,
    ) -> Result<Vec<Insight>, GatewayError> {
        let prompt = build_extraction_prompt(&chunk.text, options);
        let text = gateway
            .complete(&prompt, CompletionParams::new(EXTRACTION_MAX_TOKENS, self.temperature))
            .await?;
        let value = json::extract_array(&text)?;
        Ok(validate_insights(&value))
    }

    /// AI extraction when a gateway is online and `quick` is false, pattern
    /// matching otherwise
    pub async fn extract(&self, book: &Book, options: ExtractionOptions, quick: bool) -> (Vec<Insight>, ExtractionMode) {
        let online = self.gateway.as_ref().is_some_and(|g| g.is_online());
        if online && !quick {
            (self.extract_ai(book, options).await, ExtractionMode::Ai)
        } else {
            (self.extract_heuristic(book), ExtractionMode::Heuristic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider answering each call with the next scripted response
    struct ScriptedProvider {
        online: bool,
        responses: Mutex<Vec<Result<String, GatewayError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(online: bool, responses: Vec<Result<String, GatewayError>>) -> Self {
            Self {
                online,
                responses: Mutex::new(responses.into_iter().rev().collect()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn check_status(&self) -> bool {
            self.online
        }

        fn is_online(&self) -> bool {
            self.online
        }

        async fn complete(&self, _prompt: &str, params: CompletionParams) -> Result<String, GatewayError> {
            assert_eq!(params.max_tokens, 1000);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("[]".to_string()))
        }
    }

    fn book(content: &str) -> Book {
        Book {
            id: "book-1".to_string(),
            filename: "book.txt".to_string(),
            title: "Field Notes".to_string(),
            author: "Jane Doe".to_string(),
            word_count: content.split_whitespace().count(),
            content: content.to_string(),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_heuristic_scans_cleaned_book_text() {
        let parsed = crate::insight::parse_book("notes.txt", "Gate 12,\n\n   Line 3\tspeaks of   caution.\r\n");
        let insights = InsightExtractor::new().extract_heuristic(&parsed);

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].gate, Some(12));
        assert_eq!(insights[0].line, Some(3));
        assert_eq!(insights[0].text, "Gate 12, Line 3 speaks of caution.");
    }

    #[tokio::test]
    async fn test_failing_chunk_does_not_stop_batch() {
        let provider = Arc::new(ScriptedProvider::new(
            true,
            vec![
                Ok(r#"[{"text": "first", "gate": 23, "line": 4}]"#.to_string()),
                Err(GatewayError::Http {
                    status: 500,
                    body: String::new(),
                }),
                Ok("garbage without json".to_string()),
                Ok(r#"Sure: [{"text": "fourth", "concepts": ["resonance"]}]"#.to_string()),
            ],
        ));
        let extractor = InsightExtractor::new()
            .with_gateway(provider.clone())
            .with_chunk_words(2);

        let mut progress = Vec::new();
        let insights = extractor
            .extract_ai_with_progress(&book("a b c d e f g h"), ExtractionOptions::default(), |done, total| {
                progress.push((done, total))
            })
            .await;

        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
        assert_eq!(progress, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].text, "first");
        assert_eq!(insights[0].gate, Some(23));
        assert_eq!(insights[1].text, "fourth");
        assert!(insights
            .iter()
            .all(|i| i.book_id.as_deref() == Some("book-1") && i.book_author.as_deref() == Some("Jane Doe")));
    }

    #[tokio::test]
    async fn test_extract_uses_heuristics_when_offline() {
        let provider = Arc::new(ScriptedProvider::new(false, Vec::new()));
        let extractor = InsightExtractor::new().with_gateway(provider.clone());

        let (insights, mode) = extractor
            .extract(&book("Read Gate 23, Line 4 slowly."), ExtractionOptions::default(), false)
            .await;

        assert_eq!(mode, ExtractionMode::Heuristic);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].gate, Some(23));
        assert_eq!(insights[0].line, Some(4));
        assert_eq!(insights[0].book_title.as_deref(), Some("Field Notes"));
    }

    #[tokio::test]
    async fn test_extract_quick_flag_skips_ai() {
        let provider = Arc::new(ScriptedProvider::new(true, Vec::new()));
        let extractor = InsightExtractor::new().with_gateway(provider.clone());

        let (_, mode) = extractor
            .extract(&book("plain text"), ExtractionOptions::default(), true)
            .await;

        assert_eq!(mode, ExtractionMode::Heuristic);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extract_ai_without_gateway() {
        let insights = InsightExtractor::new()
            .extract_ai(&book("some words"), ExtractionOptions::default())
            .await;
        assert!(insights.is_empty());
    }
}
