//! Outlier review: best-effort second pass over resolved places.
//!
//! The reviewer only annotates. It never changes a real/fictional
//! classification and never fails the pipeline: a broken judge degrades to
//! the hard outliers already computed by the reconciler.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::adapters::{OutlierJudge, PlaceSummary};
use crate::domain::RealPlace;

/// Merge hard outliers with judge-flagged names, deduplicated.
///
/// The judge is optional; without one the hard outliers are returned as-is.
/// Judge failures (call failure, unparseable output) are logged and degrade
/// to the hard outliers rather than discarding them.
pub async fn review(
    real_places: &[RealPlace],
    hard_outliers: &[String],
    dominant_country: Option<&str>,
    language: &str,
    judge: Option<&dyn OutlierJudge>,
) -> Vec<String> {
    let mut flagged: Vec<String> = Vec::new();

    if let Some(judge) = judge {
        if !real_places.is_empty() {
            let summaries: Vec<PlaceSummary> =
                real_places.iter().map(PlaceSummary::from_place).collect();

            match judge.judge(&summaries, dominant_country, language).await {
                Ok(names) => {
                    debug!(flagged = names.len(), "judge review complete");
                    flagged = names;
                }
                Err(e) => {
                    warn!(error = %e, "outlier judge failed, keeping hard outliers only");
                }
            }
        }
    }

    let mut seen = HashSet::new();
    hard_outliers
        .iter()
        .cloned()
        .chain(flagged)
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Confidence, Mention};
    use anyhow::Result;
    use async_trait::async_trait;

    struct FixedJudge {
        names: Vec<String>,
    }

    #[async_trait]
    impl OutlierJudge for FixedJudge {
        async fn judge(
            &self,
            _summaries: &[PlaceSummary],
            _dominant_country: Option<&str>,
            _language: &str,
        ) -> Result<Vec<String>> {
            Ok(self.names.clone())
        }
    }

    struct BrokenJudge;

    #[async_trait]
    impl OutlierJudge for BrokenJudge {
        async fn judge(
            &self,
            _summaries: &[PlaceSummary],
            _dominant_country: Option<&str>,
            _language: &str,
        ) -> Result<Vec<String>> {
            anyhow::bail!("judge reply was unparseable")
        }
    }

    fn place(name: &str) -> RealPlace {
        RealPlace {
            original_name: name.to_string(),
            normalized_name: name.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            language: "en".into(),
            mentions: vec![Mention::new(name, format!("In {name}."), 0, name.len(), 0, None)],
            confidence: Confidence::High,
            country: Some("France".into()),
            raw_geocode: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn test_union_is_deduplicated() {
        let judge = FixedJudge { names: vec!["Berlin".into(), "Oslo".into()] };
        let places = vec![place("Paris"), place("Berlin")];
        let hard = vec!["Berlin".to_string()];

        let outliers = review(&places, &hard, Some("France"), "en", Some(&judge)).await;

        assert_eq!(outliers.len(), 2);
        assert!(outliers.contains(&"Berlin".to_string()));
        assert!(outliers.contains(&"Oslo".to_string()));
    }

    #[tokio::test]
    async fn test_judge_failure_preserves_hard_outliers() {
        let places = vec![place("Paris")];
        let hard = vec!["Berlin".to_string()];

        let outliers = review(&places, &hard, Some("France"), "en", Some(&BrokenJudge)).await;

        assert_eq!(outliers, vec!["Berlin"]);
    }

    #[tokio::test]
    async fn test_no_judge_returns_hard_outliers() {
        let places = vec![place("Paris")];
        let hard = vec!["Oslo".to_string()];

        let outliers = review(&places, &hard, Some("France"), "en", None).await;
        assert_eq!(outliers, vec!["Oslo"]);
    }

    #[tokio::test]
    async fn test_empty_places_skip_the_judge() {
        let judge = FixedJudge { names: vec!["ghost".into()] };
        let outliers = review(&[], &[], None, "en", Some(&judge)).await;
        assert!(outliers.is_empty());
    }
}
