//! Core engine logic.
//!
//! This module contains:
//! - Segmenter: overlapping, boundary-snapped text windows
//! - Aggregator: candidate grouping under a global mention cap
//! - Resolver: geocode candidates into real or fictional places
//! - Reconciler: dominant-country check with flag-then-retry
//! - Reviewer: best-effort outlier review
//! - Pipeline: stage orchestration

pub mod aggregator;
pub mod pipeline;
pub mod quota;
pub mod reconciler;
pub mod resolver;
pub mod reviewer;
pub mod segmenter;

// Re-export commonly used items
pub use aggregator::{aggregate, aggregate_into};
pub use pipeline::{GeoPipeline, PipelineOutcome, RunReport};
pub use quota::Quota;
pub use reconciler::{dominant_country, reconcile, Reconciled, OUTLIER_COUNTRY_MISMATCH};
pub use resolver::{classify_confidence, resolve, Resolved, NO_GEOCODE_RESULT};
pub use reviewer::review;
pub use segmenter::{segment, Segments, Window, SNAP_LOOKAHEAD};
