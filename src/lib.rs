//! Site Scorer Rust Implementation
//!
//! Geospatial suitability scoring for solar sites over a rectangular
//! lat/lon region.
//!
//! Pipeline:
//! - `grid`: regular lat/lon sampling grid and `Raster` storage
//! - `sources`: point and line emitters per factor
//! - `synthesis`: exponential distance-decay fields
//! - `utils/`: min-max normalization and compensated summation
//! - `combiner`: weighted fusion into a composite score
//! - `zones`: threshold classification into suitability zones
//! - `factors/`: per-factor profiles and record-to-source conversion
//! - `scorer`: end-to-end coordinator (sequential and Rayon)
//!
//! Every stage returns new arrays; nothing is mutated after construction.

pub mod combiner;
pub mod config;
pub mod data;
pub mod error;
pub mod factors;
pub mod field;
pub mod grid;
pub mod scorer;
pub mod sources;
pub mod summary;
pub mod synthesis;
pub mod utils;
pub mod zones;

// Re-export commonly used types
pub use combiner::{combine_scores, Weights};
pub use config::EngineConfig;
pub use data::{CityRecord, RegionData};
pub use error::{EngineError, EngineResult};
pub use factors::{default_profiles, Factor, FactorProfile, FactorProfiles};
pub use field::{Field, FieldKind, ScoreMap};
pub use grid::{build_grid, Grid, GridSpec, Raster};
pub use scorer::{ScoringRun, SiteAssessment, SiteScorer};
pub use sources::{register_source, Coord, Location, Source, SourceRegistry};
pub use summary::RunSummary;
pub use synthesis::{synthesize_field, synthesize_layer, FactorLayer};
pub use utils::normalize_field;
pub use zones::{classify_zones, Zone, ZoneCounts, ZoneMap, ZoneThresholds};
