//! Markdown section splitting and classification.
//!
//! Two forms of the same idea:
//! - `split_sections`: generic heading detection (`###`-style or fully
//!   bolded lines), with each section classified against a keyword table.
//!   Reused with different tables per domain (briefing cards, playbooks).
//! - `split_swot`: bounded extraction where only the four named SWOT labels
//!   act as boundaries, each section ending where the next named section
//!   begins.

use std::collections::HashMap;

use crate::types::SwotAnalysis;

/// A named bucket of heading keywords, matched case-insensitively as
/// substrings of the heading text.
#[derive(Debug, Clone, Copy)]
pub struct KeywordGroup {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
}

/// One classified section of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub content: String,
}

/// Keyword table for the overview/pain/opportunity cards of a domain
/// briefing tab.
pub const DOMAIN_CARD_GROUPS: &[KeywordGroup] = &[
    KeywordGroup {
        name: "overview",
        keywords: &["overview", "summary", "landscape", "position", "state"],
    },
    KeywordGroup {
        name: "pain",
        keywords: &["pain", "challenge", "risk", "problem", "gap", "weakness"],
    },
    KeywordGroup {
        name: "opportunity",
        keywords: &["opportunit", "recommendation", "angle", "play", "next step"],
    },
];

/// Pull the heading text out of a line, if the line looks like a heading.
///
/// Recognizes `#`-prefixed lines and lines fully wrapped in `**`. Returns
/// the heading with markup stripped.
fn heading_text(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        let text = trimmed.trim_start_matches('#').trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
        return None;
    }
    if trimmed.len() > 4 && trimmed.starts_with("**") && trimmed.ends_with("**") {
        let text = trimmed.trim_matches('*').trim().trim_end_matches(':').trim();
        if !text.is_empty() {
            return Some(text.to_string());
        }
    }
    None
}

/// Split markdown on heading lines and classify each section against the
/// keyword groups.
///
/// Returns a map from group name to the first matching section. Headings
/// that match no group are dropped from the classified result (callers
/// needing the raw text keep their own copy). A document with no headings
/// at all is still attributed wholesale to `default_group`; only the empty
/// string yields an empty map.
pub fn split_sections(
    text: &str,
    groups: &[KeywordGroup],
    default_group: &str,
) -> HashMap<String, Section> {
    let mut sections: Vec<(String, Vec<&str>)> = Vec::new();

    for line in text.lines() {
        if let Some(title) = heading_text(line) {
            sections.push((title, Vec::new()));
        } else if let Some((_, content)) = sections.last_mut() {
            content.push(line);
        }
        // Preamble before the first heading is unclassified, same as a
        // heading that matches no group.
    }

    let mut classified: HashMap<String, Section> = HashMap::new();

    if sections.is_empty() {
        if !text.is_empty() {
            classified.insert(
                default_group.to_string(),
                Section {
                    title: capitalize(default_group),
                    content: text.trim().to_string(),
                },
            );
        }
        return classified;
    }

    for (title, content_lines) in sections {
        let title_lower = title.to_lowercase();
        let group = groups.iter().find(|g| {
            g.keywords
                .iter()
                .any(|keyword| title_lower.contains(keyword))
        });
        if let Some(group) = group {
            // First matching section per group wins.
            classified.entry(group.name.to_string()).or_insert_with(|| Section {
                title,
                content: content_lines.join("\n").trim().to_string(),
            });
        }
    }

    classified
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

const SWOT_LABELS: [&str; 4] = ["strengths", "weaknesses", "opportunities", "threats"];

/// Strip markdown decoration from a potential label line.
fn stripped_label_line(line: &str) -> String {
    line.trim()
        .trim_start_matches(['#', '*', '-', ' '])
        .trim_end_matches(['*', ':', ' '])
        .to_lowercase()
}

/// Split a SWOT analysis into its four quadrants.
///
/// Only lines that are exactly one of the four named labels (after markup
/// and trailing-colon stripping) bound sections; any other heading, and any
/// prose line that merely begins with a quadrant word, is ordinary content.
/// A quadrant the model never produced stays `None`.
pub fn split_swot(text: &str) -> SwotAnalysis {
    let mut captured: HashMap<&'static str, Vec<&str>> = HashMap::new();
    let mut current: Option<&'static str> = None;

    for line in text.lines() {
        let stripped = stripped_label_line(line);
        if let Some(label) = SWOT_LABELS.iter().find(|label| stripped == **label) {
            current = Some(label);
            captured.entry(label).or_default();
            continue;
        }
        if let Some(label) = current {
            captured.entry(label).or_default().push(line);
        }
    }

    let mut take = |label: &str| -> Option<String> {
        let content = captured.remove(label)?.join("\n");
        let content = content.trim();
        if content.is_empty() {
            None
        } else {
            Some(content.to_string())
        }
    };

    SwotAnalysis {
        strengths: take("strengths"),
        weaknesses: take("weaknesses"),
        opportunities: take("opportunities"),
        threats: take("threats"),
    }
}
