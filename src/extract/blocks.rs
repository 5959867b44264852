//! Delimiter-based block extraction.
//!
//! Pulls a marker-delimited payload out of a larger markdown blob while
//! producing the cleaned remainder in the same step. The split is atomic:
//! either both the block and the remainder come back together, or the
//! extraction misses and the caller keeps the original text untouched.

/// Opening marker for the embedded JSON payload in a generated report.
pub const JSON_BLOCK_START: &str = "[START_JSON_DATA]";
/// Closing marker for the embedded JSON payload in a generated report.
pub const JSON_BLOCK_END: &str = "[END_JSON_DATA]";

/// Result of a successful block extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSplit {
    /// Bytes strictly between the two markers.
    pub block: String,
    /// The original text with the markers and the payload removed.
    pub remainder: String,
}

/// Extract the substring strictly between the first occurrence of
/// `start_marker` and the first occurrence of `end_marker`.
///
/// Returns `None` when either marker is absent or when the first
/// `end_marker` precedes the first `start_marker`. A stray closing marker
/// ahead of the block therefore makes the whole extraction miss, and the
/// caller keeps the unstructured body.
pub fn extract_block(text: &str, start_marker: &str, end_marker: &str) -> Option<BlockSplit> {
    let start = text.find(start_marker)?;
    let end = text.find(end_marker)?;
    let payload_from = start + start_marker.len();
    if end < payload_from {
        return None;
    }
    let payload_to = end;

    let mut remainder = String::with_capacity(
        text.len() - start_marker.len() - end_marker.len() - (payload_to - payload_from),
    );
    remainder.push_str(&text[..start]);
    remainder.push_str(&text[payload_to + end_marker.len()..]);

    Some(BlockSplit {
        block: text[payload_from..payload_to].to_string(),
        remainder,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_payload_and_remainder() {
        let text = format!(
            "# Report\n...body...\n{}\n{{\"a\":1}}\n{}\ntrailer",
            JSON_BLOCK_START, JSON_BLOCK_END
        );
        let split = extract_block(&text, JSON_BLOCK_START, JSON_BLOCK_END).expect("split");
        assert_eq!(split.block, "\n{\"a\":1}\n");
        assert_eq!(split.remainder, "# Report\n...body...\n\ntrailer");
    }

    #[test]
    fn test_reassembly_reproduces_original() {
        let text = format!(
            "prefix {}payload{} suffix",
            JSON_BLOCK_START, JSON_BLOCK_END
        );
        let split = extract_block(&text, JSON_BLOCK_START, JSON_BLOCK_END).expect("split");

        // Reinserting markers + payload at the original cut point gives back
        // the input byte-for-byte.
        let cut = text.find(JSON_BLOCK_START).unwrap();
        let rebuilt = format!(
            "{}{}{}{}{}",
            &split.remainder[..cut],
            JSON_BLOCK_START,
            split.block,
            JSON_BLOCK_END,
            &split.remainder[cut..]
        );
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_missing_start_marker_misses() {
        let text = format!("body {} only", JSON_BLOCK_END);
        assert!(extract_block(&text, JSON_BLOCK_START, JSON_BLOCK_END).is_none());
    }

    #[test]
    fn test_missing_end_marker_misses() {
        let text = format!("body {} only", JSON_BLOCK_START);
        assert!(extract_block(&text, JSON_BLOCK_START, JSON_BLOCK_END).is_none());
    }

    #[test]
    fn test_end_before_start_misses() {
        let text = format!("a {} b {} c", JSON_BLOCK_END, JSON_BLOCK_START);
        assert!(extract_block(&text, JSON_BLOCK_START, JSON_BLOCK_END).is_none());
    }

    #[test]
    fn test_stray_leading_end_marker_misses() {
        // A closing marker before the block invalidates the whole split,
        // even though a well-formed pair follows it.
        let text = format!(
            "{} stray\nbody\n{}payload{}",
            JSON_BLOCK_END, JSON_BLOCK_START, JSON_BLOCK_END
        );
        assert!(extract_block(&text, JSON_BLOCK_START, JSON_BLOCK_END).is_none());
    }

    #[test]
    fn test_first_marker_pair_wins() {
        let text = format!(
            "x{}one{}y{}two{}z",
            JSON_BLOCK_START, JSON_BLOCK_END, JSON_BLOCK_START, JSON_BLOCK_END
        );
        let split = extract_block(&text, JSON_BLOCK_START, JSON_BLOCK_END).expect("split");
        assert_eq!(split.block, "one");
        assert_eq!(
            split.remainder,
            format!("xy{}two{}z", JSON_BLOCK_START, JSON_BLOCK_END)
        );
    }

    #[test]
    fn test_empty_block() {
        let text = format!("a{}{}b", JSON_BLOCK_START, JSON_BLOCK_END);
        let split = extract_block(&text, JSON_BLOCK_START, JSON_BLOCK_END).expect("split");
        assert_eq!(split.block, "");
        assert_eq!(split.remainder, "ab");
    }
}
