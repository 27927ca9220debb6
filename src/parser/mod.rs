pub mod colors;
pub mod complexity;
pub mod dependencies;
pub mod file_type;
pub mod keywords;
pub mod name;

pub use colors::categorize_color;
pub use file_type::{detect_file_type, is_valid};

use crate::constants::{BRAND_GRADIENT_HEX, GRADIENT_COLOR_NAMES, KEYWORD_VOCABULARY};
use crate::models::ParsedFile;

/// Fixed vocabularies the content parser matches against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserVocabulary {
    pub keywords: Vec<String>,
    pub brand_gradient_hex: Vec<String>,
    pub gradient_color_names: Vec<String>,
}

impl Default for ParserVocabulary {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            keywords: owned(KEYWORD_VOCABULARY),
            brand_gradient_hex: owned(BRAND_GRADIENT_HEX),
            gradient_color_names: owned(GRADIENT_COLOR_NAMES),
        }
    }
}

/// Turns raw file content into a [`ParsedFile`].
///
/// Parsing never fails: each sub-extraction degrades to an empty or default
/// value when it finds nothing.
#[derive(Debug, Clone, Default)]
pub struct ContentParser {
    vocabulary: ParserVocabulary,
}

impl ContentParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vocabulary(vocabulary: ParserVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &ParserVocabulary {
        &self.vocabulary
    }

    pub fn parse(&self, filename: &str, content: &str) -> ParsedFile {
        ParsedFile {
            filename: filename.to_string(),
            file_type: file_type::detect_file_type(filename),
            name: name::extract_name(filename, content),
            keywords: keywords::extract_keywords(content, &self.vocabulary.keywords),
            colors: colors::detect_colors(
                content,
                &self.vocabulary.brand_gradient_hex,
                &self.vocabulary.gradient_color_names,
            ),
            complexity: complexity::detect_complexity(content),
            dependencies: dependencies::extract_dependencies(content),
            content: content.to_string(),
        }
    }
}
