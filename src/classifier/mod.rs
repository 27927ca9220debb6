pub mod rules;

pub use rules::{Cascade, CascadeRule, ClassifierRules, EnergyRule};

use crate::models::{Energy, GlyphSignature, ParsedFile};

/// Derive the glyph signature of a parsed file from the given rule tables.
/// Pure: no I/O, same input, same output.
pub fn classify_quick(parsed: &ParsedFile, rules: &ClassifierRules) -> GlyphSignature {
    let content = parsed.content.to_lowercase();

    GlyphSignature {
        energy: detect_energy(parsed, &content, rules),
        flow: rules.flow.resolve(&content),
        mood: rules.mood.resolve(&content),
        rhythm: rules.rhythm.resolve(&content),
    }
}

/// First energy group that matches, else the default
fn detect_energy(parsed: &ParsedFile, content_lower: &str, rules: &ClassifierRules) -> Energy {
    rules
        .energy
        .iter()
        .find(|rule| rule.matches(parsed, content_lower))
        .map(|rule| rule.energy)
        .unwrap_or(rules.energy_default)
}

/// Heuristic classifier holding its rule tables
#[derive(Debug, Clone, Default)]
pub struct HeuristicClassifier {
    rules: ClassifierRules,
}

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ClassifierRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ClassifierRules {
        &self.rules
    }

    pub fn classify_quick(&self, parsed: &ParsedFile) -> GlyphSignature {
        classify_quick(parsed, &self.rules)
    }
}
