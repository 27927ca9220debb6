use crate::gateway::GatewayError;
use serde_json::Value;

/// Byte range of the balanced span starting at `start`, which must hold `open`.
/// String literals and escapes are honored, so braces inside strings do not count.
fn balanced_end(text: &str, start: usize, open: u8, close: u8) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// First balanced `open..close` span in `text` that parses as JSON
fn find_balanced(text: &str, open: u8, close: u8) -> Option<Value> {
    text.bytes()
        .enumerate()
        .filter(|&(_, b)| b == open)
        .filter_map(|(start, _)| {
            balanced_end(text, start, open, close).map(|end| &text[start..end])
        })
        .find_map(|candidate| serde_json::from_str::<Value>(candidate).ok())
}

/// Recover the first JSON object embedded in free-form model output
pub fn extract_object(text: &str) -> Result<Value, GatewayError> {
    find_balanced(text, b'{', b'}')
        .filter(Value::is_object)
        .ok_or_else(|| GatewayError::ResponseMalformed("no JSON object found in response".to_string()))
}

/// Recover the first JSON array embedded in free-form model output
pub fn extract_array(text: &str) -> Result<Value, GatewayError> {
    find_balanced(text, b'[', b']')
        .filter(Value::is_array)
        .ok_or_else(|| GatewayError::ResponseMalformed("no JSON array found in response".to_string()))
}
