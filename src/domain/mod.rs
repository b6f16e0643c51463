//! Domain types for the bookatlas engine.
//!
//! This module contains the core data structures:
//! - Mention: one observed occurrence of a candidate location string
//! - Candidates: deduplicated, ordered groups of mentions
//! - Places: resolved real places and rejected fictional entries

pub mod candidate;
pub mod mention;
pub mod place;

// Re-export commonly used types
pub use candidate::{CandidateGroup, CandidateSet};
pub use mention::Mention;
pub use place::{Confidence, FictionalPlace, GeocodeHit, LatLng, RealPlace};
