//! Resolved and rejected place records.

use serde::{Deserialize, Serialize};

use super::mention::Mention;

/// Confidence rating for a geocoded place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// One geocoding answer, as the engine depends on it.
///
/// The fields the engine branches on are typed; everything else the oracle
/// returned is preserved opaquely in `raw` for downstream inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeHit {
    /// Formatted/normalized name, when the oracle provides one
    pub formatted_name: Option<String>,

    /// Resolved coordinates, always present
    pub location: LatLng,

    /// Place-type tags (e.g. "locality", "political")
    pub place_types: Vec<String>,

    /// Country label from the first address component tagged "country"
    pub country: Option<String>,

    /// Full oracle response payload
    pub raw: serde_json::Value,
}

/// A candidate resolved to a geocoded real-world location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealPlace {
    /// First-seen literal name from the text
    pub original_name: String,

    /// Normalized name from the geocoder
    pub normalized_name: String,

    pub latitude: f64,
    pub longitude: f64,

    /// Language the book was processed in
    pub language: String,

    /// Every mention that produced this place
    pub mentions: Vec<Mention>,

    pub confidence: Confidence,

    /// Country label extracted from the geocode response, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Raw geocoder payload, kept for downstream inspection
    pub raw_geocode: serde_json::Value,
}

impl RealPlace {
    /// Build a place from a geocode hit, falling back to the candidate key
    /// when the oracle returned no formatted name.
    pub fn from_hit(
        original_name: String,
        key: &str,
        language: String,
        mentions: Vec<Mention>,
        confidence: Confidence,
        hit: GeocodeHit,
    ) -> Self {
        Self {
            original_name,
            normalized_name: hit.formatted_name.unwrap_or_else(|| key.to_string()),
            latitude: hit.location.lat,
            longitude: hit.location.lng,
            language,
            mentions,
            confidence,
            country: hit.country,
            raw_geocode: hit.raw,
        }
    }
}

/// A candidate that could not be confidently resolved, or was demoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FictionalPlace {
    /// First-seen literal name from the text
    pub original_name: String,

    pub language: String,

    pub mentions: Vec<Mention>,

    /// Machine-readable reason (e.g. "no geocode result",
    /// "outlier_country_mismatch")
    pub reason: String,
}
