//! `@mention` scanning against a known roster.
//!
//! The scanner is roster-symmetric: it resolves any roster member the text
//! references, including the comment's author. Excluding the author from
//! side effects (notification emission) is the caller's policy, not the
//! resolver's.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::TeamMember;

static MENTION_RE: OnceLock<Regex> = OnceLock::new();

/// `@` followed by a greedy run of words. The run stops at another `@` or
/// any non-name punctuation, so a candidate may over-capture trailing words
/// ("@David Evans and") and is matched against the roster by prefix.
fn mention_re() -> &'static Regex {
    MENTION_RE.get_or_init(|| {
        Regex::new(r"@(\w+(?:[ ]\w+)*)").expect("mention regex is valid")
    })
}

/// Resolve every `@`-token in `text` against the roster by case-insensitive
/// exact name match.
///
/// Returns the referenced subset of the roster, deduplicated, in first-seen
/// order. Text with no `@` tokens resolves to an empty vec.
pub fn resolve_mentions<'a>(text: &str, roster: &'a [TeamMember]) -> Vec<&'a TeamMember> {
    let mut resolved: Vec<&TeamMember> = Vec::new();

    for capture in mention_re().captures_iter(text) {
        let candidate = capture[1].to_lowercase();
        for member in roster {
            let name = member.name.to_lowercase();
            let is_match = candidate == name
                || (candidate.starts_with(&name)
                    && candidate[name.len()..].starts_with(' '));
            if is_match && !resolved.iter().any(|m| m.name == member.name) {
                resolved.push(member);
            }
        }
    }

    resolved
}
