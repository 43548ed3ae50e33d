//! Site Scorer - Main coordinator for scoring a region
//!
//! Runs the full pipeline over a source registry:
//! grid → per-factor synthesis → normalization → weighted fusion → zones.
//! Includes both sequential and parallel (Rayon) implementations; they
//! return identical runs.
//!
//! Every stage produces new data. A `ScoringRun` is immutable and answers
//! point queries (nearest grid cell) for downstream integrations.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::combiner::{combine_scores, Weights};
use crate::config::EngineConfig;
use crate::data::CityRecord;
use crate::error::{EngineError, EngineResult};
use crate::factors::{validate_profiles, Factor, FactorProfile, FactorProfiles};
use crate::field::{Field, ScoreMap};
use crate::grid::{build_grid, Grid, GridSpec};
use crate::sources::{Coord, SourceRegistry};
use crate::synthesis::{synthesize_layer, FactorLayer};
use crate::zones::{classify_with, Zone, ZoneCounts, ZoneMap, ZoneThresholds};

/// Main site scorer
///
/// Holds a validated configuration; several scorers with different weights
/// can run side by side over the same registry.
#[derive(Debug, Clone)]
pub struct SiteScorer {
    spec: GridSpec,
    profiles: FactorProfiles,
    weights: Weights,
    thresholds: ZoneThresholds,
    parallel: bool,
}

impl SiteScorer {
    /// Validate profiles and weights and build a sequential scorer
    pub fn new(
        spec: GridSpec,
        profiles: FactorProfiles,
        thresholds: ZoneThresholds,
    ) -> EngineResult<Self> {
        validate_profiles(&profiles)?;
        let weights = Weights::from_profiles(&profiles)?;
        Ok(Self {
            spec,
            profiles,
            weights,
            thresholds,
            parallel: false,
        })
    }

    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        Ok(Self::new(config.grid, config.factors.clone(), config.thresholds)?
            .with_parallel(config.parallel))
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn thresholds(&self) -> &ZoneThresholds {
        &self.thresholds
    }

    /// Score the region (sequential or parallel per configuration)
    pub fn score(&self, registry: &SourceRegistry) -> EngineResult<ScoringRun> {
        if self.parallel {
            self.score_parallel(registry)
        } else {
            self.score_sequential(registry)
        }
    }

    /// Score the region on the calling thread
    pub fn score_sequential(&self, registry: &SourceRegistry) -> EngineResult<ScoringRun> {
        let grid = self.prepare(registry)?;

        let layers: BTreeMap<Factor, FactorLayer> = self
            .profiles
            .iter()
            .map(|(factor, profile)| {
                (*factor, self.layer(*factor, profile, &grid, registry, false))
            })
            .collect();

        self.finish(grid, layers)
    }

    /// Score the region IN PARALLEL
    ///
    /// Factors are synthesized concurrently, and each factor's rows are
    /// split across the pool. All inputs are read-only.
    pub fn score_parallel(&self, registry: &SourceRegistry) -> EngineResult<ScoringRun> {
        let grid = self.prepare(registry)?;

        let profiles: Vec<(&Factor, &FactorProfile)> = self.profiles.iter().collect();
        let layers: BTreeMap<Factor, FactorLayer> = profiles
            .into_par_iter()
            .map(|(factor, profile)| (*factor, self.layer(*factor, profile, &grid, registry, true)))
            .collect();

        self.finish(grid, layers)
    }

    /// Validate the registry against the profiles and build the grid
    fn prepare(&self, registry: &SourceRegistry) -> EngineResult<Grid> {
        if let Some(stray) = registry.factors().find(|f| !self.profiles.contains_key(f)) {
            return Err(EngineError::weights(format!(
                "sources registered for unweighted factor {}",
                stray
            )));
        }

        tracing::info!(
            "Scoring {}x{} grid: {} sources across {} factors",
            self.spec.resolution(),
            self.spec.resolution(),
            registry.len(),
            self.profiles.len()
        );
        build_grid(&self.spec)
    }

    fn layer(
        &self,
        factor: Factor,
        profile: &FactorProfile,
        grid: &Grid,
        registry: &SourceRegistry,
        parallel: bool,
    ) -> FactorLayer {
        let sources = registry.sources(factor);
        if sources.is_empty() {
            tracing::warn!("No sources for {}; its field is all zeros", factor);
        }
        synthesize_layer(factor, profile, grid, sources, parallel)
    }

    fn finish(
        &self,
        grid: Grid,
        layers: BTreeMap<Factor, FactorLayer>,
    ) -> EngineResult<ScoringRun> {
        let normalized: BTreeMap<Factor, Field> = layers
            .iter()
            .map(|(factor, layer)| (*factor, layer.normalized.clone()))
            .collect();

        let scores = combine_scores(&normalized, &self.weights)?;
        let zones = classify_with(&scores, &self.thresholds);

        let counts = ZoneCounts::tally(&zones);
        tracing::info!(
            "Zones: {} excellent, {} good, {} okay, {} not recommended",
            counts.excellent,
            counts.good,
            counts.okay,
            counts.none
        );

        Ok(ScoringRun {
            grid,
            layers,
            scores,
            zones,
            thresholds: self.thresholds,
        })
    }
}

/// Immutable product of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringRun {
    pub grid: Grid,
    pub layers: BTreeMap<Factor, FactorLayer>,
    pub scores: ScoreMap,
    pub zones: ZoneMap,
    pub thresholds: ZoneThresholds,
}

/// Composite result at a single location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteAssessment {
    pub city: String,
    pub country: String,
    /// Grid cell the city falls into
    pub cell: (usize, usize),
    pub cell_coord: Coord,
    pub score: f64,
    pub zone: Zone,
    /// Modeled sunshine at the cell in display units, if scored
    pub modeled_sunshine: Option<f64>,
    /// Irradiance reported for the city itself
    pub ghi: f64,
}

impl ScoringRun {
    pub fn layer(&self, factor: Factor) -> Option<&FactorLayer> {
        self.layers.get(&factor)
    }

    pub fn zone_counts(&self) -> ZoneCounts {
        ZoneCounts::tally(&self.zones)
    }

    /// Composite score of the cell nearest `coord`
    pub fn score_at(&self, coord: Coord) -> f64 {
        let (i, j) = self.grid.nearest_cell(coord);
        self.scores.get(i, j).copied().unwrap_or(0.0)
    }

    /// Zone of the cell nearest `coord`
    pub fn zone_at(&self, coord: Coord) -> Zone {
        let (i, j) = self.grid.nearest_cell(coord);
        self.zones
            .get(i, j)
            .and_then(|&code| Zone::from_code(code))
            .unwrap_or(Zone::None)
    }

    /// Factor value in presented units (display band or raw) nearest `coord`
    pub fn value_at(&self, factor: Factor, coord: Coord) -> Option<f64> {
        let (i, j) = self.grid.nearest_cell(coord);
        self.layer(factor)?.presented().get(i, j)
    }

    /// Look up a city's cell for the narrative integration
    pub fn assess_site(&self, city: &CityRecord) -> SiteAssessment {
        let coord = city.coord();
        let cell = self.grid.nearest_cell(coord);
        SiteAssessment {
            city: city.city.clone(),
            country: city.country.clone(),
            cell,
            cell_coord: self.grid.coord(cell.0, cell.1).unwrap_or(coord),
            score: self.score_at(coord),
            zone: self.zone_at(coord),
            modeled_sunshine: self.value_at(Factor::Sunshine, coord),
            ghi: city.ghi,
        }
    }
}
