/// Constants used throughout Paper Library
/// This module centralizes the fixed vocabularies the heuristics run on.
/// The lists are domain data: keep them verbatim, the classifier and
/// extractor tables are built from them.

/// Supported catalog file suffixes, in match order (first suffix match wins)
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".html",
    ".js",
    ".jsx",
    ".py",
    ".ts",
    ".tsx",
    ".css",
    ".json",
    ".md",
];

/// Domain terms detected by case-insensitive substring containment
pub const KEYWORD_VOCABULARY: &[&str] = &[
    "game",
    "simulation",
    "dashboard",
    "visualization",
    "animation",
    "particle",
    "physics",
    "timer",
    "clock",
    "calculator",
    "chart",
    "graph",
    "music",
    "audio",
    "synth",
    "meditation",
    "calm",
    "peaceful",
    "breathing",
    "puzzle",
    "quiz",
    "editor",
    "canvas",
    "3d",
    "generative",
    "fractal",
    "drawing",
    "todo",
    "weather",
    "chat",
    "tracker",
    "journal",
];

/// Brand gradient hex values that map to the `purple-gradient` category
pub const BRAND_GRADIENT_HEX: &[&str] = &["#667eea", "#764ba2"];

/// Coarse color names looked up inside gradient declarations, in order
pub const GRADIENT_COLOR_NAMES: &[&str] = &["blue", "green", "red"];

/// Concepts detected in insight text by substring containment
pub const CONCEPT_PATTERNS: &[&str] = &[
    "consciousness",
    "awareness",
    "quantum",
    "wave",
    "field",
    "resonance",
    "frequency",
    "energy",
    "dimension",
    "mind",
    "body",
    "spirit",
    "evolution",
    "transformation",
    "design",
];

/// Quantum keyword phrases scanned sentence by sentence in quick extraction
pub const QUANTUM_KEYWORDS: &[&str] = &[
    "wave function",
    "superposition",
    "entanglement",
    "quantum field",
    "interference",
    "resonance",
    "frequency",
    "vibration",
    "collapse",
    "probability",
    "uncertainty",
    "coherence",
    "decoherence",
];

/// Quantum concepts listed in the AI extraction prompt
pub const PROMPT_QUANTUM_CONCEPTS: &[&str] = &[
    "wave function",
    "superposition",
    "entanglement",
    "collapse",
    "interference",
    "field theory",
    "resonance",
];

/// Dimensional references listed in the AI extraction prompt
pub const DIMENSIONS: &[&str] = &["Movement", "Evolution", "Being", "Design", "Space"];

/// Gate range of the external symbolic taxonomy
pub const GATE_RANGE: std::ops::RangeInclusive<u8> = 1..=64;

/// Line range of the external symbolic taxonomy
pub const LINE_RANGE: std::ops::RangeInclusive<u8> = 1..=6;

/// Words per extraction chunk
pub const CHUNK_WORDS: usize = 3000;

/// Characters of chunk text embedded in an extraction prompt
pub const EXTRACTION_EXCERPT_CHARS: usize = 2500;

/// Token budget for a per-chunk extraction completion
pub const EXTRACTION_MAX_TOKENS: u32 = 1000;

/// Content excerpt sizes for quick and deep analysis
pub const ANALYSIS_EXCERPT_CHARS: usize = 2000;
pub const DEEP_ANALYSIS_EXCERPT_CHARS: usize = 4000;

/// Token budgets for quick and deep analysis
pub const ANALYSIS_MAX_TOKENS: u32 = 200;
pub const DEEP_ANALYSIS_MAX_TOKENS: u32 = 400;

/// Characters of context captured on each side of a gate reference
pub const GATE_CONTEXT_CHARS: usize = 200;

/// Sentences kept per quantum keyword in quick extraction
pub const SENTENCES_PER_KEYWORD: usize = 3;

/// Version tag written into export bundles
pub const EXPORT_VERSION: &str = "1.0";

/// Storage namespaces
pub const LIBRARY_NAMESPACE: &str = "paperLibrary";
pub const KNOWLEDGE_NAMESPACE: &str = "paperKnowledge";
