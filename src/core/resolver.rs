//! Resolution engine: convert candidate groups into real or fictional places.

use tracing::{debug, warn};

use crate::adapters::Geocoder;
use crate::domain::{CandidateSet, Confidence, FictionalPlace, RealPlace};

use super::quota::Quota;

/// Reason recorded when the oracle answered and found nothing.
pub const NO_GEOCODE_RESULT: &str = "no geocode result";

/// Place-type tags that pin a result to a specific location.
const SPECIFIC_TYPES: &[&str] = &[
    "locality",
    "country",
    "administrative_area_level_1",
    "administrative_area_level_2",
    "street_address",
    "premise",
    "route",
    "point_of_interest",
    "park",
    "establishment",
];

/// Classify a geocode result's confidence from its place-type tags.
///
/// The specific set is checked first: a result tagged both "political" and
/// "locality" is high, not medium. The outcome is independent of tag order.
pub fn classify_confidence(place_types: &[String]) -> Confidence {
    if place_types.iter().any(|t| SPECIFIC_TYPES.contains(&t.as_str())) {
        Confidence::High
    } else if place_types.iter().any(|t| t == "political") {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// Output of the resolution stage.
#[derive(Debug, Default)]
pub struct Resolved {
    pub real_places: Vec<RealPlace>,
    pub fictional_places: Vec<FictionalPlace>,
}

/// Resolve each candidate group against the geocoding oracle, in group order.
///
/// The quota is checked before each oracle call; resolution stops once it is
/// spent, so `real + fictional` never exceeds the cap. A failed or empty
/// oracle answer buckets the candidate as fictional with the oracle's
/// explanation; there are no retries at this stage.
pub async fn resolve(
    candidates: CandidateSet,
    language: &str,
    geocoder: &dyn Geocoder,
    quota: &mut Quota,
) -> Resolved {
    let mut resolved = Resolved::default();

    for group in candidates {
        if !quota.try_acquire() {
            debug!(cap = quota.cap(), "place cap reached, stopping resolution");
            break;
        }

        let original_name = group.display_name().to_string();

        let answer = geocoder.geocode(&group.key, language).await;
        let hit = match answer {
            Ok(hit) => hit,
            Err(e) => {
                warn!(candidate = %group.key, error = %e, "geocode call failed");
                resolved.fictional_places.push(FictionalPlace {
                    original_name,
                    language: language.to_string(),
                    mentions: group.mentions,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        match hit {
            Some(hit) => {
                let confidence = classify_confidence(&hit.place_types);
                resolved.real_places.push(RealPlace::from_hit(
                    original_name,
                    &group.key,
                    language.to_string(),
                    group.mentions,
                    confidence,
                    hit,
                ));
            }
            None => {
                resolved.fictional_places.push(FictionalPlace {
                    original_name,
                    language: language.to_string(),
                    mentions: group.mentions,
                    reason: NO_GEOCODE_RESULT.to_string(),
                });
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeocodeHit, LatLng, Mention};
    use anyhow::Result;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapGeocoder {
        answers: HashMap<String, GeocodeHit>,
    }

    #[async_trait]
    impl Geocoder for MapGeocoder {
        async fn geocode(&self, query: &str, _language: &str) -> Result<Option<GeocodeHit>> {
            Ok(self.answers.get(query).cloned())
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl Geocoder for FailingGeocoder {
        async fn geocode(&self, _query: &str, _language: &str) -> Result<Option<GeocodeHit>> {
            anyhow::bail!("geocoding service unavailable")
        }
    }

    fn hit(formatted: &str, lat: f64, lng: f64, types: &[&str], country: Option<&str>) -> GeocodeHit {
        GeocodeHit {
            formatted_name: Some(formatted.to_string()),
            location: LatLng { lat, lng },
            place_types: types.iter().map(|t| t.to_string()).collect(),
            country: country.map(String::from),
            raw: serde_json::json!({"formatted_address": formatted}),
        }
    }

    fn candidates(names: &[&str]) -> CandidateSet {
        let mut set = CandidateSet::new();
        for (i, name) in names.iter().enumerate() {
            set.push(Mention::new(
                *name,
                format!("We saw {name}."),
                i * 100,
                i * 100 + name.len(),
                0,
                None,
            ));
        }
        set
    }

    #[test]
    fn test_confidence_precedence() {
        // Specific set wins over "political" regardless of tag order
        let both = vec!["political".to_string(), "locality".to_string()];
        assert_eq!(classify_confidence(&both), Confidence::High);
        let reversed = vec!["locality".to_string(), "political".to_string()];
        assert_eq!(classify_confidence(&reversed), Confidence::High);

        assert_eq!(classify_confidence(&["political".to_string()]), Confidence::Medium);
        assert_eq!(classify_confidence(&["natural_feature".to_string()]), Confidence::Low);
        assert_eq!(classify_confidence(&[]), Confidence::Low);
    }

    #[tokio::test]
    async fn test_paris_and_atlantis() {
        let geocoder = MapGeocoder {
            answers: [(
                "paris".to_string(),
                hit("Paris, France", 48.8566, 2.3522, &["locality", "political"], Some("France")),
            )]
            .into_iter()
            .collect(),
        };

        let mut quota = Quota::new(10);
        let resolved = resolve(candidates(&["Paris", "Atlantis"]), "en", &geocoder, &mut quota).await;

        assert_eq!(resolved.real_places.len(), 1);
        let paris = &resolved.real_places[0];
        assert_eq!(paris.normalized_name, "Paris, France");
        assert_eq!(paris.confidence, Confidence::High);
        assert_eq!(paris.latitude, 48.8566);

        assert_eq!(resolved.fictional_places.len(), 1);
        let atlantis = &resolved.fictional_places[0];
        assert_eq!(atlantis.original_name, "Atlantis");
        assert_eq!(atlantis.reason, NO_GEOCODE_RESULT);
    }

    #[tokio::test]
    async fn test_cap_bounds_total_output() {
        let geocoder = MapGeocoder { answers: HashMap::new() };
        let mut quota = Quota::new(2);
        let resolved = resolve(candidates(&["A", "B", "C", "D"]), "en", &geocoder, &mut quota).await;

        assert_eq!(resolved.real_places.len() + resolved.fictional_places.len(), 2);
    }

    #[tokio::test]
    async fn test_oracle_error_buckets_as_fictional() {
        let mut quota = Quota::new(10);
        let resolved = resolve(candidates(&["Lima"]), "es", &FailingGeocoder, &mut quota).await;

        assert!(resolved.real_places.is_empty());
        assert_eq!(resolved.fictional_places.len(), 1);
        assert!(resolved.fictional_places[0].reason.contains("unavailable"));
    }

    #[tokio::test]
    async fn test_empty_candidates_yield_empty_output() {
        let geocoder = MapGeocoder { answers: HashMap::new() };
        let mut quota = Quota::new(10);
        let resolved = resolve(CandidateSet::new(), "en", &geocoder, &mut quota).await;
        assert!(resolved.real_places.is_empty());
        assert!(resolved.fictional_places.is_empty());
        assert_eq!(quota.used(), 0);
    }
}
