use crate::utils::push_unique;
use once_cell::sync::Lazy;
use regex::Regex;

static GRADIENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:linear|radial|conic)-gradient\s*\(([^;()]*(?:\([^()]*\)[^;()]*)*)\)")
        .expect("valid gradient regex")
});
static SOLID_BACKGROUND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)background(?:-color)?\s*:\s*#([0-9a-f]{6}|[0-9a-f]{3})\b")
        .expect("valid background regex")
});

/// Palette categories found in CSS gradient and background-color declarations.
///
/// Gradients are checked for the brand hex values and for the coarse color
/// names; solid hex backgrounds go through [`categorize_color`]. The result
/// keeps first-detection order.
pub fn detect_colors(content: &str, brand_hex: &[String], gradient_names: &[String]) -> Vec<String> {
    let mut colors = Vec::new();

    for caps in GRADIENT.captures_iter(content) {
        let body = caps[1].to_lowercase();
        if brand_hex.iter().any(|hex| body.contains(&hex.to_lowercase())) {
            push_unique(&mut colors, "purple-gradient");
        }
        for name in gradient_names {
            if body.contains(name.as_str()) {
                push_unique(&mut colors, name.as_str());
            }
        }
    }

    for caps in SOLID_BACKGROUND.captures_iter(content) {
        if let Some(category) = categorize_color(&caps[1]) {
            push_unique(&mut colors, category);
        }
    }

    colors
}

/// Bucket a hex color (without `#`) by its leading nibbles.
///
/// This is an approximation, not a colorimetric classifier: a leading 0-2
/// is dark and a leading e/f is light before any hue test runs, so `0af`
/// lands in `dark` although it reads blue. The checks are order-sensitive.
pub fn categorize_color(hex: &str) -> Option<&'static str> {
    let hex = hex.trim_start_matches('#').to_lowercase();
    let nibbles: Vec<u32> = match hex.len() {
        3 => hex.chars().filter_map(|c| c.to_digit(16)).collect(),
        6 => hex.chars().step_by(2).filter_map(|c| c.to_digit(16)).collect(),
        _ => return None,
    };
    if nibbles.len() != 3 {
        return None;
    }
    let (r, g, b) = (nibbles[0], nibbles[1], nibbles[2]);

    match r {
        0..=2 => return Some("dark"),
        0xe | 0xf => return Some("light"),
        _ => {}
    }

    if r >= 8 && g >= 8 && b < 8 {
        Some("yellow")
    } else if b > r && b > g {
        Some("blue")
    } else if g > r && g > b {
        Some("green")
    } else if r > g && r > b {
        Some("red")
    } else {
        None
    }
}
