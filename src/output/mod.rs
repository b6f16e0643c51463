//! Structured output writers: JSON place lists, a CSV table, a marker map.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::core::PipelineOutcome;
use crate::domain::RealPlace;

/// Paths of the files one run produced.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub real_json: PathBuf,
    pub fictional_json: PathBuf,
    pub outliers_json: PathBuf,
    pub real_csv: PathBuf,
    pub map_html: Option<PathBuf>,
}

/// Write every output artifact for a completed run.
pub fn write_outputs(
    outcome: &PipelineOutcome,
    output_dir: &Path,
    generate_map: bool,
) -> Result<OutputPaths> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    let real_json = output_dir.join("real_places.json");
    save_json(&outcome.real_places, &real_json)?;

    let fictional_json = output_dir.join("fictional_places.json");
    save_json(&outcome.fictional_places, &fictional_json)?;

    let outliers_json = output_dir.join("review_outliers.json");
    save_json(&outcome.outliers, &outliers_json)?;

    let real_csv = output_dir.join("real_places.csv");
    std::fs::write(&real_csv, places_csv(&outcome.real_places))
        .with_context(|| format!("Failed to write {}", real_csv.display()))?;

    let map_html = if generate_map && !outcome.real_places.is_empty() {
        let path = output_dir.join("places_map.html");
        std::fs::write(&path, places_map(&outcome.real_places))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    info!(dir = %output_dir.display(), "outputs written");

    Ok(OutputPaths {
        real_json,
        fictional_json,
        outliers_json,
        real_csv,
        map_html,
    })
}

fn save_json<T: serde::Serialize>(data: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize output")?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Flat CSV of the resolved places.
fn places_csv(places: &[RealPlace]) -> String {
    let mut csv =
        String::from("original_name,normalized_name,latitude,longitude,language,confidence\n");
    for p in places {
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            csv_field(&p.original_name),
            csv_field(&p.normalized_name),
            p.latitude,
            p.longitude,
            csv_field(&p.language),
            p.confidence.as_str(),
        ));
    }
    csv
}

/// Quote a CSV field when it contains a delimiter, quote or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Self-contained Leaflet map with one marker per resolved place.
fn places_map(places: &[RealPlace]) -> String {
    let center = &places[0];
    let markers: String = places
        .iter()
        .map(|p| {
            // JSON string literals double as safely-escaped JS strings
            let popup = serde_json::to_string(&format!(
                "{} ({})",
                p.normalized_name,
                p.confidence.as_str()
            ))
            .unwrap_or_else(|_| "\"\"".to_string());
            format!(
                "    L.marker([{}, {}]).addTo(map).bindPopup({});\n",
                p.latitude, p.longitude, popup
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Places</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>#map {{ height: 100vh; }}</style>
</head>
<body>
  <div id="map"></div>
  <script>
    var map = L.map('map').setView([{lat}, {lng}], 2);
    L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
      attribution: '&copy; OpenStreetMap contributors'
    }}).addTo(map);
{markers}  </script>
</body>
</html>
"#,
        lat = center.latitude,
        lng = center.longitude,
        markers = markers,
    )
}
