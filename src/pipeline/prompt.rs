use crate::constants::{
    ANALYSIS_EXCERPT_CHARS, ANALYSIS_MAX_TOKENS, DEEP_ANALYSIS_EXCERPT_CHARS, DEEP_ANALYSIS_MAX_TOKENS,
};
use crate::models::{Energy, ParsedFile};
use crate::utils::truncate_chars;

/// Excerpt length and token budget for one analysis request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisBudget {
    pub excerpt_chars: usize,
    pub max_tokens: u32,
}

impl AnalysisBudget {
    pub fn for_depth(deep: bool) -> Self {
        if deep {
            Self {
                excerpt_chars: DEEP_ANALYSIS_EXCERPT_CHARS,
                max_tokens: DEEP_ANALYSIS_MAX_TOKENS,
            }
        } else {
            Self {
                excerpt_chars: ANALYSIS_EXCERPT_CHARS,
                max_tokens: ANALYSIS_MAX_TOKENS,
            }
        }
    }
}

/// Build the analysis prompt for a parsed file
pub fn build_analysis_prompt(parsed: &ParsedFile, budget: AnalysisBudget) -> String {
    let excerpt = truncate_chars(&parsed.content, budget.excerpt_chars);
    let file_type = parsed.file_type.as_str();

    let energy_lines: String = Energy::ALL
        .iter()
        .map(|energy| format!("- {}: {}\n", energy.as_str(), prompt_meaning(*energy)))
        .collect();

    format!(
        "Analyze this {file_type} code and respond ONLY with valid JSON in this exact format:\n\
{{\n  \"description\": \"brief description of what this code does (max 2 sentences)\",\n  \
\"energy\": \"energetic|flowing|calm|focused|spiral\",\n  \
\"tags\": [\"tag1\", \"tag2\", \"tag3\"],\n  \
\"bestFor\": \"who would benefit most from this app\"\n}}\n\n\
Energy meanings (5 consciousness dimensions):\n{energy_lines}\n\
Code to analyze:\n```{file_type}\n{excerpt}\n```\n\n\
Respond with ONLY the JSON object, no markdown, no explanation."
    )
}

fn prompt_meaning(energy: Energy) -> &'static str {
    match energy {
        Energy::Energetic => "dynamic, intense, fast-paced, exciting (Movement/Individuality)",
        Energy::Flowing => "adaptive, smooth, rhythmic, evolutionary (Evolution/Mind)",
        Energy::Calm => "peaceful, gentle, meditative, grounded (Being/Body)",
        Energy::Focused => "structured, precise, analytical, organized (Design/Ego)",
        Energy::Spiral => "recursive, transformative, creative, dimensional (Space/Personality)",
    }
}
