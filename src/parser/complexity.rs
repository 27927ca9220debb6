use crate::models::Complexity;
use once_cell::sync::Lazy;
use regex::Regex;

static FUNCTION_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bfunction\s+[A-Za-z_$][A-Za-z0-9_$]*").expect("valid function regex")
});
static CLASS_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bclass\s+[A-Z][A-Za-z0-9_]*").expect("valid class regex"));
static COMPONENT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[A-Z][A-Za-z0-9]*").expect("valid component regex"));

const SIMPLE_BELOW: f64 = 10.0;
const MODERATE_BELOW: f64 = 30.0;

/// Raw complexity score:
/// `lines/100 + functions*2 + classes*3 + components*2`
pub fn complexity_score(content: &str) -> f64 {
    let lines = content.lines().count() as f64;
    let functions = FUNCTION_DECL.find_iter(content).count() as f64;
    let classes = CLASS_DECL.find_iter(content).count() as f64;
    let components = COMPONENT_TAG.find_iter(content).count() as f64;

    lines / 100.0 + functions * 2.0 + classes * 3.0 + components * 2.0
}

/// Bucket the score: below 10 is simple, below 30 moderate, else complex
pub fn classify_complexity(score: f64) -> Complexity {
    if score < SIMPLE_BELOW {
        Complexity::Simple
    } else if score < MODERATE_BELOW {
        Complexity::Moderate
    } else {
        Complexity::Complex
    }
}

pub fn detect_complexity(content: &str) -> Complexity {
    classify_complexity(complexity_score(content))
}
