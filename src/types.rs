//! Record types persisted by the collection stores.
//!
//! Every collection is a JSON array (or, for prospect books, a JSON map) with
//! no schema version tag, so all fields added after first release must be
//! additive: `#[serde(default)]` on reads, `skip_serializing_if` on writes.
//!
//! Extension fields on a report are present only after the matching
//! generation succeeded. Absence means "not yet generated", never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Reports
// =============================================================================

/// A grounding source returned by the AI transport alongside generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyStat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgChartEntry {
    pub name: String,
    pub title: String,
}

/// A prospect challenge paired with the initiative addressing it, if known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeItem {
    pub challenge: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiative: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub headline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// The six lazily generated domain-intelligence tabs on a report.
///
/// Serializes to the tab slug so `domainBriefings` persists as a plain
/// string-keyed map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DomainTab {
    Market,
    Competition,
    Technology,
    Leadership,
    Financials,
    Risk,
}

impl DomainTab {
    pub const ALL: [DomainTab; 6] = [
        DomainTab::Market,
        DomainTab::Competition,
        DomainTab::Technology,
        DomainTab::Leadership,
        DomainTab::Financials,
        DomainTab::Risk,
    ];

    /// Human-readable tab label for prompts and headings.
    pub fn label(&self) -> &'static str {
        match self {
            DomainTab::Market => "Market Position",
            DomainTab::Competition => "Competitive Landscape",
            DomainTab::Technology => "Technology Stack",
            DomainTab::Leadership => "Leadership & Org",
            DomainTab::Financials => "Financial Health",
            DomainTab::Risk => "Risk Factors",
        }
    }
}

/// A prospect report as assembled by the generation pipeline.
///
/// `content` is the markdown body with any embedded data block already
/// removed. The structured extension fields below it are filled only when
/// the corresponding extraction/generation succeeded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<Citation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executive_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_stats: Vec<KeyStat>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub org_chart: Vec<OrgChartEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub challenges: Vec<ChallengeItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub news_items: Vec<NewsItem>,

    /// Raw briefing text per domain tab. Presence is the cache key: a filled
    /// slot is never regenerated.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domain_briefings: BTreeMap<DomainTab, String>,
}

/// A persisted report. `id` and `saved_at` are assigned once at save time
/// and never reassigned; later updates touch only the flattened payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedReport {
    pub id: String,
    pub saved_at: String,
    #[serde(flatten)]
    pub data: ReportData,
}

// =============================================================================
// Prospect books & collaboration
// =============================================================================

/// A team member known to the mention resolver and share flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub text: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareEntry {
    pub user: String,
    pub role: String,
}

/// A working notebook for one prospect.
///
/// Books live in a map keyed by the lower-cased prospect name: the key is
/// the single source of identity, so two books for the same normalized name
/// collapse into one record. `created_at` is fixed at first creation;
/// `updated_at` refreshes on every mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectBook {
    /// Name as the user typed it; the map key holds the normalized form.
    pub display_name: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub executive_summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub shared_with: Vec<ShareEntry>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

// =============================================================================
// Notifications & activity
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Share,
    Mention,
}

/// Created as a side effect of another mutation (a share, a mention in a
/// comment). Never mutated except to flip `is_read`; never user-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub actor: String,
    pub message: String,
    pub link_to: String,
    pub is_read: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Generation,
    Outreach,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

/// Append-only log entry. Newest-first by prepending; never updated or
/// removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEvent {
    pub id: String,
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub module: String,
    pub details: ActivityDetails,
}

// =============================================================================
// Templates, gaps, watchlist
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTemplate {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub created_at: String,
}

/// A product gap surfaced during a deal. The `prospect` reference is
/// advisory text, not a foreign key; nothing enforces it at the storage
/// layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductGap {
    pub id: String,
    pub prospect: String,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistItem {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistAlert {
    pub id: String,
    pub item_name: String,
    pub headline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub created_at: String,
}

// =============================================================================
// SWOT
// =============================================================================

/// A SWOT split of a free-text analysis. A missing quadrant means the model
/// never produced that section, not that the split failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwotAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threats: Option<String>,
}
