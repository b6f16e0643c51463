//! Country reconciliation: flag, retry and demote cross-country geocodes.
//!
//! A book is usually set in one country; a place geocoded elsewhere is either
//! a legitimate cross-border mention or a silently-wrong geocode. The
//! flag-then-retry design lets the former re-resolve inside the dominant
//! country's frame while the latter is demoted.

use tracing::{debug, info, warn};

use crate::adapters::Geocoder;
use crate::domain::{FictionalPlace, RealPlace};

use super::resolver::classify_confidence;

/// Reason recorded when a country-mismatch retry fails.
pub const OUTLIER_COUNTRY_MISMATCH: &str = "outlier_country_mismatch";

/// Output of the reconciliation stage.
#[derive(Debug)]
pub struct Reconciled {
    pub real_places: Vec<RealPlace>,
    pub fictional_places: Vec<FictionalPlace>,
    /// Normalized names flagged by the deterministic country-mismatch rule
    pub hard_outliers: Vec<String>,
    pub dominant_country: Option<String>,
}

/// Most frequent non-empty country label among the places.
///
/// Ties break toward the label seen first, so the result is deterministic.
pub fn dominant_country(places: &[RealPlace]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for country in places.iter().filter_map(|p| p.country.as_deref()) {
        match counts.iter_mut().find(|(name, _)| *name == country) {
            Some(entry) => entry.1 += 1,
            None => counts.push((country, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (name, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((name, count));
        }
    }
    best.map(|(name, _)| name.to_string())
}

/// Re-examine every place geocoded outside the dominant country.
///
/// Mismatched places are flagged as hard outliers and retried with a
/// country-qualified query. A successful retry replaces the place (same
/// mentions, new geocode); a failed retry demotes it to fictional. When no
/// place carries a country label, reconciliation is a no-op.
pub async fn reconcile(
    real_places: Vec<RealPlace>,
    mut fictional_places: Vec<FictionalPlace>,
    language: &str,
    geocoder: &dyn Geocoder,
) -> Reconciled {
    let Some(dominant) = dominant_country(&real_places) else {
        debug!("no country labels present, skipping reconciliation");
        return Reconciled {
            real_places,
            fictional_places,
            hard_outliers: Vec::new(),
            dominant_country: None,
        };
    };

    info!(country = %dominant, "dominant country computed");

    let mut kept = Vec::with_capacity(real_places.len());
    let mut hard_outliers = Vec::new();

    for place in real_places {
        let mismatch = place
            .country
            .as_deref()
            .is_some_and(|c| !c.is_empty() && c != dominant);
        if !mismatch {
            kept.push(place);
            continue;
        }

        hard_outliers.push(place.normalized_name.clone());
        let query = format!("{} {}", place.original_name, dominant);
        debug!(place = %place.normalized_name, %query, "retrying country-mismatched place");

        let retried = match geocoder.geocode(&query, language).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(place = %place.normalized_name, error = %e, "retry geocode failed");
                None
            }
        };

        match retried {
            Some(hit) => {
                let confidence = classify_confidence(&hit.place_types);
                let key = place.original_name.to_lowercase();
                kept.push(RealPlace::from_hit(
                    place.original_name,
                    &key,
                    place.language,
                    place.mentions,
                    confidence,
                    hit,
                ));
            }
            None => {
                fictional_places.push(FictionalPlace {
                    original_name: place.original_name,
                    language: place.language,
                    mentions: place.mentions,
                    reason: OUTLIER_COUNTRY_MISMATCH.to_string(),
                });
            }
        }
    }

    Reconciled {
        real_places: kept,
        fictional_places,
        hard_outliers,
        dominant_country: Some(dominant),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Confidence, GeocodeHit, LatLng, Mention};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct RetryGeocoder {
        answers: HashMap<String, GeocodeHit>,
        queries: Mutex<Vec<String>>,
    }

    impl RetryGeocoder {
        fn new(answers: HashMap<String, GeocodeHit>) -> Self {
            Self { answers, queries: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl Geocoder for RetryGeocoder {
        async fn geocode(&self, query: &str, _language: &str) -> Result<Option<GeocodeHit>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.answers.get(query).cloned())
        }
    }

    fn place(original: &str, normalized: &str, country: &str) -> RealPlace {
        RealPlace {
            original_name: original.to_string(),
            normalized_name: normalized.to_string(),
            latitude: 1.0,
            longitude: 2.0,
            language: "en".into(),
            mentions: vec![Mention::new(original, format!("At {original}."), 0, original.len(), 0, None)],
            confidence: Confidence::High,
            country: Some(country.to_string()),
            raw_geocode: serde_json::json!({}),
        }
    }

    fn hit(formatted: &str, country: &str, types: &[&str]) -> GeocodeHit {
        GeocodeHit {
            formatted_name: Some(formatted.to_string()),
            location: LatLng { lat: 3.0, lng: 4.0 },
            place_types: types.iter().map(|t| t.to_string()).collect(),
            country: Some(country.to_string()),
            raw: serde_json::json!({}),
        }
    }

    #[test]
    fn test_dominant_country_most_frequent() {
        let places = vec![
            place("A", "A1", "France"),
            place("B", "B1", "Germany"),
            place("C", "C1", "France"),
        ];
        assert_eq!(dominant_country(&places).as_deref(), Some("France"));
    }

    #[test]
    fn test_dominant_country_tie_breaks_first_seen() {
        let places = vec![place("A", "A1", "Spain"), place("B", "B1", "Chile")];
        assert_eq!(dominant_country(&places).as_deref(), Some("Spain"));
    }

    #[test]
    fn test_dominant_country_none_without_labels() {
        let mut p = place("A", "A1", "x");
        p.country = None;
        assert_eq!(dominant_country(&[p]), None);
    }

    #[tokio::test]
    async fn test_consistent_list_is_untouched() {
        let geocoder = RetryGeocoder::new(HashMap::new());
        let real = vec![place("Lyon", "Lyon, France", "France"), place("Nice", "Nice, France", "France")];

        let reconciled = reconcile(real, Vec::new(), "en", &geocoder).await;

        assert_eq!(reconciled.real_places.len(), 2);
        assert!(reconciled.fictional_places.is_empty());
        assert!(reconciled.hard_outliers.is_empty());
        assert_eq!(reconciled.dominant_country.as_deref(), Some("France"));
        // No retry calls were issued
        assert!(geocoder.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_retry_demotes_to_fictional() {
        let geocoder = RetryGeocoder::new(HashMap::new());
        let real = vec![
            place("Lyon", "Lyon, France", "France"),
            place("Nice", "Nice, France", "France"),
            place("Halle", "Halle, Germany", "Germany"),
        ];

        let reconciled = reconcile(real, Vec::new(), "en", &geocoder).await;

        assert_eq!(reconciled.hard_outliers, vec!["Halle, Germany"]);
        assert_eq!(reconciled.real_places.len(), 2);
        assert_eq!(reconciled.fictional_places.len(), 1);
        assert_eq!(reconciled.fictional_places[0].reason, OUTLIER_COUNTRY_MISMATCH);
        // The retry used a country-qualified query
        assert_eq!(geocoder.queries.lock().unwrap().as_slice(), ["Halle France"]);
        // The consistent places pass through unchanged in order
        assert_eq!(reconciled.real_places[0].normalized_name, "Lyon, France");
        assert_eq!(reconciled.real_places[1].normalized_name, "Nice, France");
    }

    #[tokio::test]
    async fn test_successful_retry_replaces_place() {
        let answers = [(
            "Halle France".to_string(),
            hit("Halle, France", "France", &["locality", "political"]),
        )]
        .into_iter()
        .collect();
        let geocoder = RetryGeocoder::new(answers);

        let real = vec![
            place("Lyon", "Lyon, France", "France"),
            place("Nice", "Nice, France", "France"),
            place("Halle", "Halle, Germany", "Germany"),
        ];

        let reconciled = reconcile(real, Vec::new(), "en", &geocoder).await;

        // Still flagged as a hard outlier, but kept with the retried geocode
        assert_eq!(reconciled.hard_outliers, vec!["Halle, Germany"]);
        assert_eq!(reconciled.real_places.len(), 3);
        assert!(reconciled.fictional_places.is_empty());

        let replaced = &reconciled.real_places[2];
        assert_eq!(replaced.normalized_name, "Halle, France");
        assert_eq!(replaced.country.as_deref(), Some("France"));
        assert_eq!(replaced.latitude, 3.0);
        // Mentions travel with the replacement
        assert_eq!(replaced.mentions.len(), 1);
        assert_eq!(replaced.original_name, "Halle");
    }

    #[tokio::test]
    async fn test_label_less_place_passes_through() {
        let geocoder = RetryGeocoder::new(HashMap::new());
        let mut unlabelled = place("Somewhere", "Somewhere", "x");
        unlabelled.country = None;
        let real = vec![place("Lyon", "Lyon, France", "France"), unlabelled];

        let reconciled = reconcile(real, Vec::new(), "en", &geocoder).await;

        assert_eq!(reconciled.real_places.len(), 2);
        assert!(reconciled.hard_outliers.is_empty());
    }
}
