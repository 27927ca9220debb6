use crate::constants::{DIMENSIONS, EXTRACTION_EXCERPT_CHARS, PROMPT_QUANTUM_CONCEPTS};
use crate::utils::truncate_chars;
use serde::{Deserialize, Serialize};

/// Which instruction blocks the extraction prompt carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOptions {
    pub gates: bool,
    pub quantum: bool,
    pub dimensions: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            gates: true,
            quantum: true,
            dimensions: true,
        }
    }
}

const SCHEMA_PREAMBLE: &str = r#"Analyze this text and extract key insights. Respond ONLY with a JSON array of insights in this format:

[
  {
    "text": "the actual insight or quote",
    "gate": 23,
    "line": 4,
    "concepts": ["quantum mechanics", "wave function", "consciousness"],
    "dimension": "Evolution"
  }
]

"#;

/// Build the per-chunk extraction prompt
pub fn build_extraction_prompt(text: &str, options: ExtractionOptions) -> String {
    let mut prompt = String::from(SCHEMA_PREAMBLE);

    if options.gates {
        prompt.push_str("- Look for references to Gates (1-64) and Lines (1-6) from Human Design\n");
    }
    if options.quantum {
        prompt.push_str(&format!(
            "- Extract quantum mechanics concepts: {}\n",
            PROMPT_QUANTUM_CONCEPTS.join(", ")
        ));
    }
    if options.dimensions {
        prompt.push_str(&format!(
            "- Identify dimensional references: {}\n",
            DIMENSIONS.join(", ")
        ));
    }

    prompt.push_str("\nText to analyze:\n");
    prompt.push_str(truncate_chars(text, EXTRACTION_EXCERPT_CHARS));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_with_all_blocks() {
        let prompt = build_extraction_prompt("Some text.", ExtractionOptions::default());
        assert!(prompt.starts_with("Analyze this text and extract key insights."));
        assert!(prompt.contains("Gates (1-64) and Lines (1-6)"));
        assert!(prompt.contains(
            "quantum mechanics concepts: wave function, superposition, entanglement, collapse, interference, field theory, resonance"
        ));
        assert!(prompt.contains("dimensional references: Movement, Evolution, Being, Design, Space"));
        assert!(prompt.ends_with("Text to analyze:\nSome text."));
    }

    #[test]
    fn test_prompt_omits_disabled_blocks() {
        let options = ExtractionOptions {
            gates: false,
            quantum: true,
            dimensions: false,
        };
        let prompt = build_extraction_prompt("Some text.", options);
        assert!(!prompt.contains("Gates (1-64)"));
        assert!(prompt.contains("quantum mechanics concepts"));
        assert!(!prompt.contains("dimensional references"));
    }

    #[test]
    fn test_prompt_truncates_chunk() {
        let text = "é".repeat(3000);
        let prompt = build_extraction_prompt(&text, ExtractionOptions::default());
        assert!(prompt.ends_with(&"é".repeat(2500)));
        assert!(!prompt.contains(&"é".repeat(2501)));
    }
}
