use crate::constants::{GATE_RANGE, LINE_RANGE};
use crate::models::Insight;
use crate::utils::push_unique;
use serde_json::Value;
use tracing::debug;

/// Integer in `range`, accepting numbers and numeric strings
fn ranged(value: Option<&Value>, range: &std::ops::RangeInclusive<u8>) -> Option<u8> {
    let n = match value? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u8::try_from(n).ok().filter(|n| range.contains(n))
}

/// Validate one array item. Items without usable text are dropped; an
/// out-of-range gate or line is cleared, and a line without a gate is cleared.
pub fn validate_insight(item: &Value) -> Option<Insight> {
    let text = item.get("text")?.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    let gate = ranged(item.get("gate"), &GATE_RANGE);
    let line = gate.and(ranged(item.get("line"), &LINE_RANGE));

    let mut concepts = Vec::new();
    if let Some(items) = item.get("concepts").and_then(Value::as_array) {
        for concept in items.iter().filter_map(Value::as_str) {
            let concept = concept.trim();
            if !concept.is_empty() {
                push_unique(&mut concepts, concept);
            }
        }
    }

    let dimension = item
        .get("dimension")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Some(Insight {
        text: text.to_string(),
        gate,
        line,
        concepts,
        dimension,
        ..Default::default()
    })
}

/// Validate a recovered JSON array into insights, skipping invalid items
pub fn validate_insights(value: &Value) -> Vec<Insight> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    let insights: Vec<Insight> = items.iter().filter_map(validate_insight).collect();
    if insights.len() < items.len() {
        debug!("Dropped {} invalid insight items", items.len() - insights.len());
    }
    insights
}
