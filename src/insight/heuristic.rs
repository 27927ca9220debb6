use crate::constants::{CONCEPT_PATTERNS, GATE_CONTEXT_CHARS, GATE_RANGE, LINE_RANGE, QUANTUM_KEYWORDS, SENTENCES_PER_KEYWORD};
use crate::models::Insight;
use crate::utils::{char_window, push_unique};
use once_cell::sync::Lazy;
use regex::Regex;

static GATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Gate\s+(\d{1,2})(?:[,.\s]+Line\s+(\d))?").expect("valid gate regex")
});

/// Vocabularies for pattern-based extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightVocabulary {
    /// Concepts tagged by substring containment
    pub concepts: Vec<String>,
    /// Phrases whose containing sentences become insights
    pub quantum_keywords: Vec<String>,
}

impl Default for InsightVocabulary {
    fn default() -> Self {
        Self {
            concepts: CONCEPT_PATTERNS.iter().map(|s| s.to_string()).collect(),
            quantum_keywords: QUANTUM_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Concepts contained in `text`, case-insensitive, in vocabulary order
pub fn extract_concepts(text: &str, concepts: &[String]) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    for concept in concepts {
        if lower.contains(concept.as_str()) {
            push_unique(&mut found, concept.as_str());
        }
    }
    found
}

/// Insights for every in-range `Gate N[, Line M]` reference, with the
/// surrounding text as context
pub fn gate_insights(text: &str, vocabulary: &InsightVocabulary) -> Vec<Insight> {
    GATE_PATTERN
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let gate = caps[1].parse::<u8>().ok().filter(|g| GATE_RANGE.contains(g))?;
            let line = caps
                .get(2)
                .and_then(|m| m.as_str().parse::<u8>().ok())
                .filter(|l| LINE_RANGE.contains(l));

            let context = char_window(text, whole.start(), GATE_CONTEXT_CHARS);
            Some(Insight {
                text: context.trim().to_string(),
                gate: Some(gate),
                line,
                concepts: extract_concepts(context, &vocabulary.concepts),
                ..Default::default()
            })
        })
        .collect()
}

/// Pattern for a period-terminated run containing `keyword`
fn sentence_pattern(keyword: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?i)[^.]*{}[^.]*\.", regex::escape(keyword)))
}

/// Up to a few sentences per quantum keyword, tagged with the keyword and
/// any detected concepts
pub fn keyword_insights(text: &str, vocabulary: &InsightVocabulary) -> Vec<Insight> {
    let mut insights = Vec::new();

    for keyword in &vocabulary.quantum_keywords {
        let Ok(pattern) = sentence_pattern(keyword) else {
            continue;
        };

        for sentence in pattern.find_iter(text).take(SENTENCES_PER_KEYWORD) {
            let sentence = sentence.as_str();
            let mut concepts = vec![keyword.clone()];
            for concept in extract_concepts(sentence, &vocabulary.concepts) {
                push_unique(&mut concepts, concept);
            }

            insights.push(Insight {
                text: sentence.trim().to_string(),
                concepts,
                ..Default::default()
            });
        }
    }

    insights
}

/// Pattern-only extraction: gate references first, then keyword sentences.
/// The two passes are not deduplicated against each other.
pub fn quick_extraction(text: &str, vocabulary: &InsightVocabulary) -> Vec<Insight> {
    let mut insights = gate_insights(text, vocabulary);
    insights.extend(keyword_insights(text, vocabulary));
    insights
}
