use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source language of a cataloged file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Html,
    Javascript,
    Python,
    Typescript,
    Css,
    Json,
    Markdown,
    #[default]
    Unknown,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Html => "html",
            FileType::Javascript => "javascript",
            FileType::Python => "python",
            FileType::Typescript => "typescript",
            FileType::Css => "css",
            FileType::Json => "json",
            FileType::Markdown => "markdown",
            FileType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Simple,
    Moderate,
    Complex,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Moderate => "moderate",
            Complexity::Complex => "complex",
        }
    }
}

/// Top-level mood category of a catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Energy {
    Energetic,
    Flowing,
    Calm,
    #[default]
    Focused,
    Spiral,
}

impl Energy {
    pub const ALL: [Energy; 5] = [
        Energy::Energetic,
        Energy::Flowing,
        Energy::Calm,
        Energy::Focused,
        Energy::Spiral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Energy::Energetic => "energetic",
            Energy::Flowing => "flowing",
            Energy::Calm => "calm",
            Energy::Focused => "focused",
            Energy::Spiral => "spiral",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Energy::Energetic => "⚡",
            Energy::Flowing => "〰️",
            Energy::Calm => "🌊",
            Energy::Focused => "🔥",
            Energy::Spiral => "🌀",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Energy::Energetic => "Dynamic, intense, exciting (Movement/Individuality)",
            Energy::Flowing => "Adaptive, smooth, rhythmic (Evolution/Mind)",
            Energy::Calm => "Peaceful, gentle, grounded (Being/Body)",
            Energy::Focused => "Structured, precise, analytical (Design/Ego)",
            Energy::Spiral => "Recursive, transformative, creative (Space/Personality)",
        }
    }
}

impl fmt::Display for Energy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Energy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Energy::ALL
            .iter()
            .copied()
            .find(|energy| energy.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown energy '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    #[default]
    Straight,
    Wavy,
    Spiral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Energetic,
    Contemplative,
    Creative,
    Searching,
    Transformative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rhythm {
    #[default]
    Continuous,
    Punctuated,
    Hesitant,
}

/// Four-field heuristic descriptor computed without AI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GlyphSignature {
    pub energy: Energy,
    pub flow: Flow,
    pub mood: Mood,
    pub rhythm: Rhythm,
}

/// Structured view of an ingested file, produced by the content parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFile {
    pub filename: String,
    pub file_type: FileType,
    /// Display title derived from the content or the filename
    pub name: String,
    /// Vocabulary terms present in the content, in vocabulary order
    pub keywords: Vec<String>,
    /// Palette categories, in order of first detection
    pub colors: Vec<String>,
    pub complexity: Complexity,
    pub dependencies: Vec<String>,
    pub content: String,
}

/// Final catalog entry for an ingested file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Analysis {
    pub name: String,
    pub filename: String,
    pub description: String,
    pub energy: Energy,
    /// Heuristic signature; AI enrichment never overwrites it
    pub glyphs: GlyphSignature,
    pub tags: Vec<String>,
    pub best_for: String,
    pub content: String,
    pub file_type: FileType,
    pub complexity: Complexity,
    pub dependencies: Vec<String>,
    /// Blake3 hash of the content, used to skip duplicate ingestion
    pub content_hash: String,
}

impl Analysis {
    /// Baseline entry built from the parsed file and its heuristic signature
    pub fn from_parsed(parsed: &ParsedFile, glyphs: GlyphSignature) -> Self {
        Self {
            name: parsed.name.clone(),
            filename: parsed.filename.clone(),
            description: String::new(),
            energy: glyphs.energy,
            glyphs,
            tags: parsed.keywords.clone(),
            best_for: String::new(),
            content: parsed.content.clone(),
            file_type: parsed.file_type,
            complexity: parsed.complexity,
            dependencies: parsed.dependencies.clone(),
            content_hash: crate::utils::content_hash(&parsed.content),
        }
    }
}

/// A quote or derived sentence extracted from a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u8>,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_book_id")]
    pub book_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_author: Option<String>,
}

impl Insight {
    /// Attach the source book's provenance
    pub fn stamped(mut self, book: &Book) -> Self {
        self.book_id = Some(book.id.clone());
        self.book_title = Some(book.title.clone());
        self.book_author = Some(book.author.clone());
        self
    }
}

/// A parsed long-form document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Book {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub filename: String,
    pub title: String,
    pub author: String,
    pub word_count: usize,
    /// Whitespace-normalized text
    pub content: String,
    pub timestamp: String,
}

/// Accept string or numeric record ids; older exports used numbers
pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn deserialize_book_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_id(deserializer).map(|id| Some(id).filter(|id| !id.is_empty()))
}

/// A word-count-bounded slice of a larger document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of the chunk in the source document
    pub index: usize,
    pub text: String,
    pub word_count: usize,
}
