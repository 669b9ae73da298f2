//! Relay list normalization.
//!
//! User-supplied relay configuration arrives as free-form text: either a
//! JSON array of relay URLs or a comma-separated list. [`normalize`] turns
//! both into an ordered address list and never errors — malformed input
//! degrades to an empty list, which callers treat as a configuration
//! problem, not an exception.

use serde_json::Value;

/// Parse free-form relay input into an ordered address list.
///
/// JSON-array inputs keep their string elements (trimmed, empties dropped)
/// in order. Anything that is not a JSON array falls back to
/// comma-separated parsing of the original text. Pure and idempotent.
pub fn normalize(input: &str) -> Vec<String> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(input) {
        return items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => {
                    let trimmed = s.trim();
                    (!trimmed.is_empty()).then(|| trimmed.to_string())
                }
                _ => None,
            })
            .collect();
    }

    input
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}
