use crate::models::{Complexity, Energy, Flow, Mood, ParsedFile, Rhythm};

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// One energy rule group: a disjunction of keyword, color, complexity and
/// content-substring tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnergyRule {
    pub energy: Energy,
    pub keywords: Vec<String>,
    pub colors: Vec<String>,
    pub complexity: Option<Complexity>,
    /// Substrings tested against the lowercased content
    pub content: Vec<String>,
}

impl EnergyRule {
    /// True if any trigger of the group fires. `content_lower` must already be lowercased.
    pub fn matches(&self, parsed: &ParsedFile, content_lower: &str) -> bool {
        self.keywords.iter().any(|k| parsed.keywords.contains(k))
            || self.colors.iter().any(|c| parsed.colors.contains(c))
            || self.complexity.is_some_and(|c| parsed.complexity == c)
            || self.content.iter().any(|s| content_lower.contains(s.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadeRule<T> {
    pub value: T,
    pub triggers: Vec<String>,
}

/// Substring cascade where the last matching rule wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cascade<T> {
    pub default: T,
    pub rules: Vec<CascadeRule<T>>,
}

impl<T: Copy> Cascade<T> {
    pub fn resolve(&self, content_lower: &str) -> T {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.triggers.iter().any(|t| content_lower.contains(t.as_str())))
            .map(|rule| rule.value)
            .unwrap_or(self.default)
    }

    fn rule(value: T, triggers: &[&str]) -> CascadeRule<T> {
        CascadeRule {
            value,
            triggers: owned(triggers),
        }
    }
}

/// Ordered rule tables for the quick glyph classifier.
///
/// Energy groups are tried in order and the first match wins; flow, mood and
/// rhythm cascades let the last match win. The asymmetry is part of the
/// classification contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierRules {
    pub energy: Vec<EnergyRule>,
    pub energy_default: Energy,
    pub flow: Cascade<Flow>,
    pub mood: Cascade<Mood>,
    pub rhythm: Cascade<Rhythm>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        let energy = vec![
            // Movement / Individuality
            EnergyRule {
                energy: Energy::Energetic,
                keywords: owned(&["game", "simulation"]),
                colors: owned(&["red"]),
                complexity: Some(Complexity::Complex),
                content: owned(&["particle", "animation", "dynamic", "intense", "burst", "explosive"]),
            },
            // Evolution / Mind
            EnergyRule {
                energy: Energy::Flowing,
                keywords: Vec::new(),
                colors: owned(&["blue"]),
                complexity: None,
                content: owned(&["flow", "wave", "smooth", "rhythm", "adaptive", "evolution", "memory"]),
            },
            // Being / Body
            EnergyRule {
                energy: Energy::Calm,
                keywords: owned(&["meditation", "calm", "peaceful"]),
                colors: owned(&["green", "light"]),
                complexity: None,
                content: owned(&["gentle", "serene", "tranquil", "touch", "sensation"]),
            },
            // Space / Personality
            EnergyRule {
                energy: Energy::Spiral,
                keywords: Vec::new(),
                colors: Vec::new(),
                complexity: None,
                content: owned(&[
                    "spiral",
                    "recursive",
                    "transform",
                    "metamorph",
                    "personality",
                    "imagination",
                    "creative",
                    "generative",
                    "self-referential",
                    "fractal",
                    "dimension",
                ]),
            },
        ];

        Self {
            energy,
            energy_default: Energy::Focused,
            flow: Cascade {
                default: Flow::Straight,
                rules: vec![
                    Cascade::rule(Flow::Wavy, &["curve", "wave"]),
                    Cascade::rule(Flow::Spiral, &["spiral", "circular"]),
                ],
            },
            mood: Cascade {
                default: Mood::Energetic,
                rules: vec![
                    Cascade::rule(Mood::Contemplative, &["contemplat", "meditat"]),
                    Cascade::rule(Mood::Creative, &["creat", "art"]),
                    Cascade::rule(Mood::Searching, &["search", "explore"]),
                    Cascade::rule(Mood::Transformative, &["transform"]),
                ],
            },
            rhythm: Cascade {
                default: Rhythm::Continuous,
                rules: vec![
                    Cascade::rule(Rhythm::Punctuated, &["burst", "pulse"]),
                    Cascade::rule(Rhythm::Hesitant, &["pause", "hesita"]),
                ],
            },
        }
    }
}
