//! bookatlas - place extraction and geographic reconciliation for books
//!
//! Turns long natural-language text into a list of geolocated real-world
//! places plus a list of mentions judged fictional or unresolvable, with a
//! confidence rating and a country-level consistency check.
//!
//! # Architecture
//!
//! The engine is a sequence of stages, each returning new collections:
//!
//! ```text
//! Segmenter → mentions → Aggregator → candidates → Resolver
//!     → (real, fictional) → Reconciler → (real', fictional', hard outliers)
//!     → Reviewer → outlier list
//! ```
//!
//! External capabilities (extraction backend, geocoding oracle, outlier
//! judge) are consumed as traits; concrete implementations live in
//! `adapters`.
//!
//! # Modules
//!
//! - `adapters`: Oracle interfaces and implementations (Google, OpenAI)
//! - `core`: Engine stages and pipeline orchestration
//! - `domain`: Data structures (Mention, CandidateSet, places)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Extract and geocode places from a book
//! bookatlas run book.txt --output-dir outputs
//!
//! # Summarize a previous run
//! bookatlas inspect outputs/real_places.json
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod ingest;
pub mod lang;
pub mod output;

// Re-export main types at crate root for convenience
pub use crate::adapters::{Extractor, Geocoder, OutlierJudge, PlaceSummary};
pub use crate::config::{ConfigError, EngineSettings, ResolvedConfig};
pub use crate::core::{GeoPipeline, PipelineOutcome, Quota, RunReport};
pub use crate::domain::{
    CandidateSet, Confidence, FictionalPlace, GeocodeHit, LatLng, Mention, RealPlace,
};
