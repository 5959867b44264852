//! Prompt construction for every AI-backed operation.
//!
//! Pure string builders. The profile prompt instructs the model to append
//! its structured payload inside the `[START_JSON_DATA]` markers; the
//! extraction engine owns getting it back out.

use crate::extract::{JSON_BLOCK_END, JSON_BLOCK_START};
use crate::types::DomainTab;

/// Main prospect-profile prompt. Body in markdown, structured extensions in
/// a delimited JSON block after the body.
pub fn prospect_profile(prospect: &str) -> String {
    format!(
        "Write a sales intelligence report on \"{prospect}\" in markdown: company background, \
         current strategy, buying signals, and recommended approach.\n\n\
         After the report, append a machine-readable block delimited by {start} and {end} \
         containing one JSON object with these optional fields: \
         \"executiveSummary\" (string), \"financialSummary\" (string), \
         \"keyStats\" (array of {{\"label\", \"value\"}}), \
         \"orgChart\" (array of {{\"name\", \"title\"}}), \
         \"challenges\" (array of {{\"challenge\", \"initiative\"}}), \
         \"technologies\" (array of strings), \
         \"newsItems\" (array of {{\"headline\", \"date\", \"summary\", \"uri\"}}). \
         Omit any field you cannot support with the report.",
        prospect = prospect,
        start = JSON_BLOCK_START,
        end = JSON_BLOCK_END,
    )
}

/// Ask for the canonical company name behind whatever the user typed.
pub fn normalize_prospect_name(entered: &str) -> String {
    format!(
        "What is the canonical legal/trading name of the company commonly referred to as \
         \"{entered}\"? Reply with the name only, no punctuation or commentary."
    )
}

/// Per-tab domain intelligence briefing, section-split downstream into
/// overview/pain/opportunity cards.
pub fn domain_briefing(prospect: &str, tab: DomainTab) -> String {
    format!(
        "Write a \"{topic}\" briefing for the prospect \"{prospect}\" in markdown. \
         Use three sections with headings: an overview of their {topic_lower}, \
         the pain points and challenges it creates for them, and the sales \
         opportunities it opens for us.",
        topic = tab.label(),
        topic_lower = tab.label().to_lowercase(),
        prospect = prospect,
    )
}

pub fn swot(prospect: &str) -> String {
    format!(
        "Write a SWOT analysis of \"{prospect}\" in markdown with exactly four sections headed \
         Strengths, Weaknesses, Opportunities, and Threats."
    )
}

pub fn outreach_draft(prospect: &str, channel: &str) -> String {
    format!(
        "Draft a short, personalized {channel} outreach message to a decision maker at \
         \"{prospect}\". Reference their likely priorities; no placeholders."
    )
}

pub fn talking_points(prospect: &str) -> String {
    format!(
        "List five concise talking points for a first sales call with \"{prospect}\", \
         each one sentence, markdown bullets."
    )
}

/// Watchlist scan for one item. The response is expected to be a JSON array
/// of alerts; the normalizer strips whatever the model wraps it in.
pub fn watchlist_scan(item_name: &str, criteria: Option<&str>) -> String {
    let focus = criteria
        .map(|c| format!(" Focus on: {c}."))
        .unwrap_or_default();
    format!(
        "List notable recent events for the company \"{item_name}\" relevant to a sales team \
         (funding, leadership changes, launches, incidents).{focus} \
         Respond with a JSON array of objects with fields \"headline\" (string) and \
         \"summary\" (string). Respond with an empty array if nothing is notable."
    )
}
