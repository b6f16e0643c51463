//! Google Geocoding API oracle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{GeocodeHit, LatLng};

use super::Geocoder;

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Geocoder backed by the Google Maps Geocoding API.
pub struct GoogleGeocoder {
    api_key: String,
    endpoint: String,
    client: reqwest::Client,
}

/// Top-level geocode API response
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// Typed view of the result fields the engine depends on
#[derive(Debug, Deserialize)]
struct RawResult {
    formatted_address: Option<String>,
    geometry: Option<RawGeometry>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    address_components: Vec<RawComponent>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    long_name: Option<String>,
    short_name: Option<String>,
    #[serde(default)]
    types: Vec<String>,
}

impl GoogleGeocoder {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: GEOCODE_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point at a different endpoint (tests, proxies).
    pub fn with_endpoint(api_key: String, endpoint: impl Into<String>) -> Self {
        Self {
            api_key,
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Parse the first result of a geocode payload into a typed hit.
    ///
    /// A result without usable coordinates is treated as no result: the
    /// engine never produces a partially-resolved place.
    fn parse_response(payload: GeocodeResponse) -> Option<GeocodeHit> {
        if payload.status != "OK" {
            return None;
        }
        let raw = payload.results.into_iter().next()?;
        let result: RawResult = serde_json::from_value(raw.clone()).ok()?;
        let location = result.geometry.and_then(|g| g.location)?;
        let country = result.address_components.iter().find_map(|comp| {
            if comp.types.iter().any(|t| t == "country") {
                comp.long_name.clone().or_else(|| comp.short_name.clone())
            } else {
                None
            }
        });

        Some(GeocodeHit {
            formatted_name: result.formatted_address,
            location,
            place_types: result.types,
            country,
            raw,
        })
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, query: &str, language: &str) -> Result<Option<GeocodeHit>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("address", query),
                ("key", self.api_key.as_str()),
                ("language", language),
            ])
            .send()
            .await
            .context("Failed to reach geocoding API")?;

        let payload: GeocodeResponse = response
            .json()
            .await
            .context("Failed to parse geocoding response")?;

        debug!(%query, status = %payload.status, results = payload.results.len(), "geocode answer");

        Ok(Self::parse_response(payload))
    }
}
