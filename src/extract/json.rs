//! Fence-stripping JSON normalizer.
//!
//! Models wrap payloads in ```json fences, preface them with prose, or trail
//! them with commentary. `normalize_json_payload` carves out a best-effort
//! JSON-parseable substring; it is a heuristic, not a validator, and never
//! attempts a full parse itself. Parsing and error handling stay with the
//! caller.
//!
//! The first-open/last-close scan deliberately over-captures when a blob
//! holds multiple JSON-like substrings. Known limitation, kept for parity
//! with how responses were extracted historically.

use serde::de::DeserializeOwned;

/// Reduce `raw` to the substring most likely to parse as JSON.
///
/// Trims, strips an optional triple-backtick fence (with or without a
/// `json` tag), then returns the span from the first `{` or `[` to the last
/// `}` or `]`. With no opening delimiter the input comes back unchanged so
/// the caller's parse fails and surfaces the miss.
pub fn normalize_json_payload(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        // Drop the fence tag line ("json" or empty), then the closing fence.
        let body = match rest.find('\n') {
            Some(nl) => &rest[nl + 1..],
            None => rest,
        };
        let body = body.trim_end();
        text = body.strip_suffix("```").unwrap_or(body).trim();
    }

    let first_open = match (text.find('{'), text.find('[')) {
        (Some(obj), Some(arr)) => obj.min(arr),
        (Some(obj), None) => obj,
        (None, Some(arr)) => arr,
        (None, None) => return raw,
    };
    let last_close = match (text.rfind('}'), text.rfind(']')) {
        (Some(obj), Some(arr)) => obj.max(arr),
        (Some(obj), None) => obj,
        (None, Some(arr)) => arr,
        (None, None) => return text,
    };
    if last_close < first_open {
        return text;
    }

    &text[first_open..=last_close]
}

/// Normalize then parse in one step. The error is the caller's to recover
/// from, usually by falling back to "unstructured body only".
pub fn parse_json_payload<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(normalize_json_payload(raw))
}
