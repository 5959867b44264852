//! Report assembly pipeline.
//!
//! The flow behind "generate a prospect profile": normalize the entered
//! name (AI call), confirm with the user when the canonical name differs or
//! a same-name report already exists, generate the main report, split the
//! embedded JSON payload out of the body, persist, and lazily extend the
//! persisted record per domain tab as further AI calls resolve.
//!
//! Extraction failures never fail the pipeline: a missing or unparsable
//! payload degrades to "extensions absent, body kept verbatim". A transport
//! failure leaves prior persisted state unmodified.
//!
//! There is no cancellation token. An in-flight generation the user has
//! navigated away from still completes and still persists its result.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::CoreError;
use crate::extract::{
    extract_block, parse_json_payload, split_sections, split_swot, Section, DOMAIN_CARD_GROUPS,
    JSON_BLOCK_END, JSON_BLOCK_START,
};
use crate::prompts;
use crate::provider::{GeneratedText, IntelligenceProvider};
use crate::store::Stores;
use crate::types::{
    ActivityKind, ChallengeItem, DomainTab, KeyStat, NewsItem, OrgChartEntry, ReportData,
    SavedReport, SwotAnalysis,
};

/// Outcome of starting a profile generation.
#[derive(Debug)]
pub enum GenerationStart {
    /// Generation ran to completion and persisted.
    Ready(SavedReport),
    /// Explicit user action required before generating: the canonical name
    /// differs from what was typed, or a same-name report already exists.
    /// Proceed via [`ReportPipeline::generate_confirmed`] or drop.
    NeedsConfirmation {
        entered: String,
        canonical: String,
        existing_report_id: Option<String>,
    },
}

/// The overview/pain/opportunity cards of one domain tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainBriefing {
    pub overview: Option<Section>,
    pub pain: Option<Section>,
    pub opportunity: Option<Section>,
}

/// Structured payload embedded in a profile response between the JSON
/// markers. Every field optional; the model omits what it cannot support.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportExtensions {
    #[serde(default)]
    executive_summary: Option<String>,
    #[serde(default)]
    financial_summary: Option<String>,
    #[serde(default)]
    key_stats: Vec<KeyStat>,
    #[serde(default)]
    org_chart: Vec<OrgChartEntry>,
    #[serde(default)]
    challenges: Vec<ChallengeItem>,
    #[serde(default)]
    technologies: Vec<String>,
    #[serde(default)]
    news_items: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlertPayload {
    headline: String,
    #[serde(default)]
    summary: Option<String>,
}

/// Split a profile response into body and extensions.
///
/// Missing markers leave the whole text as the body. An unparsable payload
/// keeps the original text unsplit and the extensions absent; the split is
/// all-or-nothing.
fn extract_report(title: &str, generated: &GeneratedText) -> ReportData {
    let mut data = ReportData {
        title: title.to_string(),
        content: generated.text.trim().to_string(),
        citations: generated.sources.clone(),
        ..Default::default()
    };

    let Some(split) = extract_block(&generated.text, JSON_BLOCK_START, JSON_BLOCK_END) else {
        return data;
    };
    match parse_json_payload::<ReportExtensions>(&split.block) {
        Ok(ext) => {
            data.content = split.remainder.trim().to_string();
            data.executive_summary = ext.executive_summary.filter(|s| !s.is_empty());
            data.financial_summary = ext.financial_summary.filter(|s| !s.is_empty());
            data.key_stats = ext.key_stats;
            data.org_chart = ext.org_chart;
            data.challenges = ext.challenges;
            data.technologies = ext.technologies;
            data.news_items = ext.news_items;
        }
        Err(e) => {
            log::warn!(
                "Report payload for '{}' unparsable, keeping body verbatim: {}",
                title,
                e
            );
        }
    }
    data
}

/// Build the briefing cards from a tab's raw text.
fn briefing_cards(raw: &str) -> DomainBriefing {
    let mut sections = split_sections(raw, DOMAIN_CARD_GROUPS, "overview");
    DomainBriefing {
        overview: sections.remove("overview"),
        pain: sections.remove("pain"),
        opportunity: sections.remove("opportunity"),
    }
}

pub struct ReportPipeline {
    stores: Arc<Stores>,
    provider: Arc<dyn IntelligenceProvider>,
}

impl ReportPipeline {
    pub fn new(stores: Arc<Stores>, provider: Arc<dyn IntelligenceProvider>) -> Self {
        ReportPipeline { stores, provider }
    }

    /// Normalize the entered name and either generate straight through or
    /// hand back a confirmation request.
    pub async fn generate_profile(&self, entered: &str) -> Result<GenerationStart, CoreError> {
        let canonical = self.normalize_name(entered).await?;
        let existing = self.stores.reports.find_by_title(&canonical);

        let differs = !canonical.eq_ignore_ascii_case(entered.trim());
        if differs || existing.is_some() {
            return Ok(GenerationStart::NeedsConfirmation {
                entered: entered.trim().to_string(),
                canonical,
                existing_report_id: existing.map(|r| r.id),
            });
        }

        Ok(GenerationStart::Ready(self.run_generation(&canonical).await?))
    }

    /// Generate after the user confirmed the canonical name (or chose to
    /// generate a duplicate anyway).
    pub async fn generate_confirmed(&self, canonical: &str) -> Result<SavedReport, CoreError> {
        self.run_generation(canonical).await
    }

    async fn run_generation(&self, prospect: &str) -> Result<SavedReport, CoreError> {
        let generated = self
            .provider
            .generate(&prompts::prospect_profile(prospect))
            .await?;
        let data = extract_report(prospect, &generated);
        let saved = self.stores.reports.save(data)?;
        self.stores.activity.record(
            ActivityKind::Generation,
            "prospect-profile",
            prospect,
            None,
        )?;
        log::info!("Persisted prospect profile for '{}'", prospect);
        Ok(saved)
    }

    async fn normalize_name(&self, entered: &str) -> Result<String, CoreError> {
        let generated = self
            .provider
            .generate(&prompts::normalize_prospect_name(entered.trim()))
            .await?;
        let canonical = generated
            .text
            .lines()
            .next()
            .unwrap_or("")
            .trim()
            .trim_matches('"')
            .trim_end_matches('.')
            .trim()
            .to_string();
        if canonical.is_empty() {
            // A blank canonicalization is a miss, not an error.
            return Ok(entered.trim().to_string());
        }
        Ok(canonical)
    }

    /// Return the briefing for one domain tab, generating it on first view.
    ///
    /// Content presence is the cache key: a filled slot is returned without
    /// an AI call and never expires. `Ok(None)` (logged) when the report is
    /// gone.
    pub async fn ensure_domain_briefing(
        &self,
        report_id: &str,
        tab: DomainTab,
    ) -> Result<Option<DomainBriefing>, CoreError> {
        let Some(report) = self.stores.reports.get(report_id) else {
            log::warn!("Domain briefing requested for missing report {}", report_id);
            return Ok(None);
        };
        if let Some(raw) = report.data.domain_briefings.get(&tab) {
            return Ok(Some(briefing_cards(raw)));
        }

        let generated = self
            .provider
            .generate(&prompts::domain_briefing(&report.data.title, tab))
            .await?;
        let raw = generated.text;

        let updated = self.stores.reports.update_data(report_id, |data| {
            data.domain_briefings.insert(tab, raw.clone());
        })?;
        if updated.is_none() {
            // Report deleted while the request was in flight.
            return Ok(None);
        }
        self.stores.activity.record(
            ActivityKind::Generation,
            "domain-briefing",
            &report.data.title,
            Some(tab.label()),
        )?;
        Ok(Some(briefing_cards(&raw)))
    }

    /// Generate and persist a SWOT analysis as a report tagged `swot`.
    pub async fn generate_swot(
        &self,
        prospect: &str,
    ) -> Result<(SavedReport, SwotAnalysis), CoreError> {
        let generated = self.provider.generate(&prompts::swot(prospect)).await?;
        let swot = split_swot(&generated.text);
        let saved = self.stores.reports.save(ReportData {
            title: prospect.to_string(),
            content: generated.text.trim().to_string(),
            citations: generated.sources,
            module: Some("swot".to_string()),
            ..Default::default()
        })?;
        self.stores
            .activity
            .record(ActivityKind::Generation, "swot", prospect, None)?;
        Ok((saved, swot))
    }

    /// Draft an outreach message. Not persisted; the activity log is the
    /// only record.
    pub async fn draft_outreach(
        &self,
        prospect: &str,
        channel: &str,
    ) -> Result<String, CoreError> {
        let generated = self
            .provider
            .generate(&prompts::outreach_draft(prospect, channel))
            .await?;
        self.stores
            .activity
            .record(ActivityKind::Outreach, "outreach", prospect, Some(channel))?;
        Ok(generated.text)
    }

    pub async fn generate_talking_points(&self, prospect: &str) -> Result<String, CoreError> {
        let generated = self
            .provider
            .generate(&prompts::talking_points(prospect))
            .await?;
        self.stores.activity.record(
            ActivityKind::Generation,
            "talking-points",
            prospect,
            None,
        )?;
        Ok(generated.text)
    }

    /// Run every watchlist item through the provider and persist the alerts
    /// it reports. A failed call or unparsable response skips that item.
    /// Returns the number of alerts added.
    pub async fn scan_watchlist(&self) -> Result<usize, CoreError> {
        let mut added = 0usize;
        for item in self.stores.watchlist.items() {
            let generated = match self
                .provider
                .generate(&prompts::watchlist_scan(&item.name, item.criteria.as_deref()))
                .await
            {
                Ok(g) => g,
                Err(e) => {
                    log::warn!("Watchlist scan failed for '{}': {}", item.name, e);
                    continue;
                }
            };
            let alerts = match parse_json_payload::<Vec<AlertPayload>>(&generated.text) {
                Ok(alerts) => alerts,
                Err(e) => {
                    log::warn!("Watchlist response for '{}' unparsable: {}", item.name, e);
                    continue;
                }
            };
            for alert in alerts {
                self.stores.watchlist.add_alert(
                    &item.name,
                    &alert.headline,
                    alert.summary.as_deref(),
                )?;
                added += 1;
            }
        }
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::SignalBus;
    use crate::provider::test_support::ScriptedProvider;
    use crate::store::MemoryStorage;

    fn fixture() -> (Arc<Stores>, Arc<ScriptedProvider>, ReportPipeline) {
        let stores = Arc::new(Stores::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(SignalBus::new()),
        ));
        let provider = Arc::new(ScriptedProvider::new());
        let pipeline = ReportPipeline::new(
            Arc::clone(&stores),
            Arc::clone(&provider) as Arc<dyn IntelligenceProvider>,
        );
        (stores, provider, pipeline)
    }

    const WELL_FORMED: &str = "# Report\n...body...\n[START_JSON_DATA]\n{\"executiveSummary\":\"Sum.\"}\n[END_JSON_DATA]";

    #[tokio::test]
    async fn test_profile_extracts_payload_and_persists() {
        let (stores, provider, pipeline) = fixture();
        provider.queue_text("Acme Corp");
        provider.queue_text(WELL_FORMED);

        let start = pipeline.generate_profile("Acme Corp").await.expect("generate");
        let saved = match start {
            GenerationStart::Ready(saved) => saved,
            other => panic!("expected Ready, got {:?}", other),
        };

        assert_eq!(saved.data.content, "# Report\n...body...");
        assert_eq!(saved.data.executive_summary.as_deref(), Some("Sum."));

        let listed = stores.reports.list();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, saved.id);

        let activity = stores.activity.list();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].kind, ActivityKind::Generation);
        assert_eq!(activity[0].details.primary, "Acme Corp");
    }

    #[tokio::test]
    async fn test_malformed_payload_keeps_body_verbatim() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (stores, provider, pipeline) = fixture();
        let malformed = "# Report\n...body...\n[START_JSON_DATA]\n{\"executiveSummary\":\"Sum.\",}\n[END_JSON_DATA]";
        provider.queue_text("Acme Corp");
        provider.queue_text(malformed);

        let start = pipeline.generate_profile("Acme Corp").await.expect("generate");
        let saved = match start {
            GenerationStart::Ready(saved) => saved,
            other => panic!("expected Ready, got {:?}", other),
        };

        // body left unsplit, extensions absent
        assert_eq!(saved.data.content, malformed);
        assert!(saved.data.executive_summary.is_none());
        assert_eq!(stores.reports.list().len(), 1);
    }

    #[tokio::test]
    async fn test_canonical_name_difference_requires_confirmation() {
        let (stores, provider, pipeline) = fixture();
        provider.queue_text("Acme Corporation");

        let start = pipeline.generate_profile("acme").await.expect("normalize");
        match start {
            GenerationStart::NeedsConfirmation {
                entered,
                canonical,
                existing_report_id,
            } => {
                assert_eq!(entered, "acme");
                assert_eq!(canonical, "Acme Corporation");
                assert!(existing_report_id.is_none());
            }
            other => panic!("expected NeedsConfirmation, got {:?}", other),
        }
        // nothing persisted until the user confirms
        assert!(stores.reports.list().is_empty());

        provider.queue_text(WELL_FORMED);
        let saved = pipeline
            .generate_confirmed("Acme Corporation")
            .await
            .expect("confirmed");
        assert_eq!(saved.data.title, "Acme Corporation");
        assert_eq!(stores.reports.list().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_report_requires_confirmation() {
        let (stores, provider, pipeline) = fixture();
        let existing = stores
            .reports
            .save(ReportData {
                title: "Acme Corp".to_string(),
                ..Default::default()
            })
            .expect("seed");

        provider.queue_text("Acme Corp");
        let start = pipeline.generate_profile("Acme Corp").await.expect("start");
        match start {
            GenerationStart::NeedsConfirmation {
                existing_report_id, ..
            } => assert_eq!(existing_report_id.as_deref(), Some(existing.id.as_str())),
            other => panic!("expected NeedsConfirmation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_leaves_store_unmodified() {
        let (stores, provider, pipeline) = fixture();
        provider.queue_text("Acme Corp");
        provider.queue_failure("quota");

        let err = pipeline
            .generate_profile("Acme Corp")
            .await
            .expect_err("transport error");
        assert!(err.is_transport());
        assert!(stores.reports.list().is_empty());
        assert!(stores.activity.list().is_empty());
    }

    #[tokio::test]
    async fn test_domain_briefing_generates_once_then_serves_cache() {
        let (stores, provider, pipeline) = fixture();
        let report = stores
            .reports
            .save(ReportData {
                title: "Acme Corp".to_string(),
                ..Default::default()
            })
            .expect("seed");

        provider
            .queue_text("### Overview\nSteady.\n\n### Challenges\nLegacy.\n\n### Opportunities\nMigrate.");

        let first = pipeline
            .ensure_domain_briefing(&report.id, DomainTab::Technology)
            .await
            .expect("briefing")
            .expect("present");
        assert_eq!(first.overview.as_ref().unwrap().content, "Steady.");
        assert_eq!(first.pain.as_ref().unwrap().content, "Legacy.");
        assert_eq!(first.opportunity.as_ref().unwrap().content, "Migrate.");

        // raw text persisted on the report record
        let stored = stores.reports.get(&report.id).expect("report");
        assert!(stored
            .data
            .domain_briefings
            .contains_key(&DomainTab::Technology));

        // second view: no AI call (the script is empty and would error)
        let calls_before = provider.prompts_seen.lock().len();
        let second = pipeline
            .ensure_domain_briefing(&report.id, DomainTab::Technology)
            .await
            .expect("briefing")
            .expect("present");
        assert_eq!(second, first);
        assert_eq!(provider.prompts_seen.lock().len(), calls_before);
    }

    #[tokio::test]
    async fn test_domain_briefing_unstructured_response_becomes_overview() {
        let (stores, provider, pipeline) = fixture();
        let report = stores
            .reports
            .save(ReportData {
                title: "Acme Corp".to_string(),
                ..Default::default()
            })
            .expect("seed");
        provider.queue_text("Flat prose with no headings at all.");

        let briefing = pipeline
            .ensure_domain_briefing(&report.id, DomainTab::Market)
            .await
            .expect("briefing")
            .expect("present");
        assert_eq!(
            briefing.overview.as_ref().unwrap().content,
            "Flat prose with no headings at all."
        );
        assert!(briefing.pain.is_none());
        assert!(briefing.opportunity.is_none());
    }

    #[tokio::test]
    async fn test_domain_briefing_for_missing_report_is_none() {
        let (_, _, pipeline) = fixture();
        let result = pipeline
            .ensure_domain_briefing("rep-ghost", DomainTab::Risk)
            .await
            .expect("no error");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_swot_persists_tagged_report() {
        let (stores, provider, pipeline) = fixture();
        provider.queue_text(
            "## Strengths\nBrand.\n\n## Weaknesses\nMargins.\n\n## Opportunities\nAPAC.\n\n## Threats\nChurn.",
        );

        let (saved, swot) = pipeline.generate_swot("Acme Corp").await.expect("swot");
        assert_eq!(saved.data.module.as_deref(), Some("swot"));
        assert_eq!(swot.strengths.as_deref(), Some("Brand."));
        assert_eq!(swot.threats.as_deref(), Some("Churn."));
        assert_eq!(stores.reports.list().len(), 1);
    }

    #[tokio::test]
    async fn test_outreach_draft_records_activity_only() {
        let (stores, provider, pipeline) = fixture();
        provider.queue_text("Hi there,\n\nSaw your Series C news...");

        let draft = pipeline
            .draft_outreach("Acme Corp", "email")
            .await
            .expect("draft");
        assert!(draft.starts_with("Hi there,"));
        assert!(stores.reports.list().is_empty());

        let activity = stores.activity.list();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].kind, ActivityKind::Outreach);
        assert_eq!(activity[0].details.secondary.as_deref(), Some("email"));
    }

    #[tokio::test]
    async fn test_watchlist_scan_persists_alerts_and_skips_bad_items() {
        let (stores, provider, pipeline) = fixture();
        stores.watchlist.add_item("Acme Corp", None).expect("item");
        stores.watchlist.add_item("Beta Inc", None).expect("item");

        // newest-first: Beta Inc is scanned first
        provider.queue_text("not json at all, no brackets");
        provider.queue_text(
            "```json\n[{\"headline\": \"Acme raises Series C\", \"summary\": \"$40M round.\"}]\n```",
        );

        let added = pipeline.scan_watchlist().await.expect("scan");
        assert_eq!(added, 1);

        let alerts = stores.watchlist.alerts();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].item_name, "Acme Corp");
        assert_eq!(alerts[0].headline, "Acme raises Series C");
        assert_eq!(alerts[0].summary.as_deref(), Some("$40M round."));
    }
}
