//! Pipeline orchestration: segment, aggregate, resolve, reconcile, review.
//!
//! Stages run sequentially and each returns new collections; nothing
//! produced upstream is mutated in place. Configuration is threaded
//! explicitly through every call so caps and thresholds are testable per
//! run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::adapters::{Extractor, Geocoder, OutlierJudge};
use crate::config::EngineSettings;
use crate::domain::{CandidateSet, FictionalPlace, RealPlace};

use super::aggregator::aggregate_into;
use super::quota::Quota;
use super::reconciler::reconcile;
use super::resolver::resolve;
use super::reviewer::review;
use super::segmenter::segment;

/// Final output of one pipeline run.
#[derive(Debug, Serialize, Deserialize)]
pub struct PipelineOutcome {
    pub language: String,
    pub real_places: Vec<RealPlace>,
    pub fictional_places: Vec<FictionalPlace>,
    /// Names flagged for human review (hard outliers plus judge flags)
    pub outliers: Vec<String>,
    pub report: RunReport,
}

/// Bookkeeping for one run, for logging and inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub windows_extracted: usize,
    pub mentions_collected: usize,
    pub candidate_groups: usize,
}

/// The mention aggregation and geographic reconciliation engine.
pub struct GeoPipeline<'a> {
    extractor: &'a dyn Extractor,
    geocoder: &'a dyn Geocoder,
    judge: Option<&'a dyn OutlierJudge>,
}

impl<'a> GeoPipeline<'a> {
    pub fn new(extractor: &'a dyn Extractor, geocoder: &'a dyn Geocoder) -> Self {
        Self {
            extractor,
            geocoder,
            judge: None,
        }
    }

    /// Attach an optional outlier judge for the review pass.
    pub fn with_judge(mut self, judge: &'a dyn OutlierJudge) -> Self {
        self.judge = Some(judge);
        self
    }

    /// Run the full pipeline over one document.
    ///
    /// Extraction errors abort the run; oracle no-matches and judge failures
    /// are absorbed by the stages that own them, so a completed run has
    /// every candidate classified as exactly one of real or fictional.
    #[instrument(skip(self, text, settings), fields(language = %language, bytes = text.len()))]
    pub async fn run(
        &self,
        text: &str,
        language: &str,
        settings: &EngineSettings,
    ) -> anyhow::Result<PipelineOutcome> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, "starting place extraction run");

        // Segment + extract + aggregate under one shared mention quota
        let mut mention_quota = Quota::new(settings.max_mentions);
        let mut candidates = CandidateSet::new();
        let mut windows_extracted = 0;

        for window in segment(text, settings.window_chars, settings.overlap_chars) {
            if mention_quota.is_exhausted() {
                info!(windows = windows_extracted, "mention cap reached, stopping extraction");
                break;
            }
            let mentions = self
                .extractor
                .extract(window.text, window.index, window.start, language)
                .await?;
            windows_extracted += 1;
            aggregate_into(&mut candidates, mentions, &mut mention_quota);
        }

        info!(
            windows = windows_extracted,
            mentions = candidates.mention_count(),
            groups = candidates.len(),
            "aggregation complete"
        );

        let mentions_collected = candidates.mention_count();
        let candidate_groups = candidates.len();

        // Resolve candidates under the place quota
        let mut place_quota = Quota::new(settings.max_mentions);
        let resolved = resolve(candidates, language, self.geocoder, &mut place_quota).await;
        info!(
            real = resolved.real_places.len(),
            fictional = resolved.fictional_places.len(),
            "resolution complete"
        );

        // Reconcile countries, then review
        let reconciled = reconcile(
            resolved.real_places,
            resolved.fictional_places,
            language,
            self.geocoder,
        )
        .await;

        let outliers = review(
            &reconciled.real_places,
            &reconciled.hard_outliers,
            reconciled.dominant_country.as_deref(),
            language,
            self.judge,
        )
        .await;

        let completed_at = Utc::now();
        info!(
            %run_id,
            real = reconciled.real_places.len(),
            fictional = reconciled.fictional_places.len(),
            outliers = outliers.len(),
            "run complete"
        );

        Ok(PipelineOutcome {
            language: language.to_string(),
            real_places: reconciled.real_places,
            fictional_places: reconciled.fictional_places,
            outliers,
            report: RunReport {
                run_id,
                started_at,
                completed_at,
                windows_extracted,
                mentions_collected,
                candidate_groups,
            },
        })
    }
}
