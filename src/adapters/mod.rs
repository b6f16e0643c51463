//! Oracle interfaces for external systems.
//!
//! The engine consumes three capabilities as abstract interfaces: an
//! extraction backend, a geocoding oracle, and an outlier judge. Concrete
//! implementations (Google Geocoding, OpenAI chat completions) live in
//! submodules; tests plug in local mocks.

pub mod google;
pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{GeocodeHit, Mention, RealPlace};

// Re-export the concrete oracles
pub use google::GoogleGeocoder;
pub use openai::{OpenAiExtractor, OpenAiJudge};

/// Extraction backend: produce location mentions from one chunk of text.
///
/// Implementations receive the chunk's index and document offset and must
/// return document-global offsets. Backends that cannot locate a returned
/// span exactly (LLM-style extraction) may anchor it best-effort.
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        chunk: &str,
        chunk_index: usize,
        chunk_offset: usize,
        language: &str,
    ) -> Result<Vec<Mention>>;
}

/// Geocoding oracle: answer a free-form query with at most one structured hit.
///
/// `Ok(None)` means the oracle answered and found nothing; transport or
/// parse failures surface as errors and are handled by the caller.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str, language: &str) -> Result<Option<GeocodeHit>>;
}

/// Compact per-place summary submitted to the outlier judge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceSummary {
    pub name: String,
    pub original: String,
    pub country: Option<String>,
    pub lat: f64,
    pub lng: f64,
    /// One representative sentence of context
    pub sentence: String,
}

impl PlaceSummary {
    pub fn from_place(place: &RealPlace) -> Self {
        Self {
            name: place.normalized_name.clone(),
            original: place.original_name.clone(),
            country: place.country.clone(),
            lat: place.latitude,
            lng: place.longitude,
            sentence: place
                .mentions
                .first()
                .map(|m| m.sentence.clone())
                .unwrap_or_default(),
        }
    }
}

/// Outlier judge: flag contextually-suspicious resolved places by name.
#[async_trait]
pub trait OutlierJudge: Send + Sync {
    async fn judge(
        &self,
        summaries: &[PlaceSummary],
        dominant_country: Option<&str>,
        language: &str,
    ) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Confidence;

    #[test]
    fn test_summary_takes_first_mention_sentence() {
        let place = RealPlace {
            original_name: "Arequipa".into(),
            normalized_name: "Arequipa, Peru".into(),
            latitude: -16.4,
            longitude: -71.5,
            language: "es".into(),
            mentions: vec![
                Mention::new("Arequipa", "El volcán domina Arequipa.", 10, 18, 0, None),
                Mention::new("Arequipa", "Arequipa otra vez.", 90, 98, 1, None),
            ],
            confidence: Confidence::High,
            country: Some("Peru".into()),
            raw_geocode: serde_json::json!({}),
        };

        let summary = PlaceSummary::from_place(&place);
        assert_eq!(summary.sentence, "El volcán domina Arequipa.");
        assert_eq!(summary.country.as_deref(), Some("Peru"));
    }
}
