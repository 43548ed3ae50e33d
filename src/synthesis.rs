//! Field Synthesizer
//!
//! Turns a factor's sources into one raw field over the grid by
//! distance-decay accumulation:
//!
//! ```text
//! d(i,j)    = sqrt((lon(i,j) - src_lon)² + (lat(i,j) - src_lat)²)   // degrees
//! w(i,j)    = exp(-d(i,j) / decay_scale)
//! raw(i,j) += w(i,j) × magnitude                                      // every vertex
//! ```
//!
//! Sources add up, so clusters of emitters produce hot spots. Every cell
//! accumulates its emitters in registry order; the parallel variant splits
//! rows across rayon workers without changing that order, so both variants
//! return bit-identical fields.

use rayon::prelude::*;
use serde::Serialize;

use crate::factors::{Factor, FactorProfile};
use crate::field::{Field, FieldKind};
use crate::grid::{Grid, Raster};
use crate::sources::{Coord, Source};
use crate::utils::normalization::normalize_field;

/// A single point emitter (one vertex of a source)
#[derive(Debug, Clone, Copy)]
struct Emitter {
    at: Coord,
    magnitude: f64,
    decay_scale: f64,
}

impl Emitter {
    #[inline]
    fn influence(&self, lat: f64, lon: f64) -> f64 {
        let d = ((lon - self.at.lon).powi(2) + (lat - self.at.lat).powi(2)).sqrt();
        (-d / self.decay_scale).exp() * self.magnitude
    }
}

fn emitters(sources: &[Source]) -> Vec<Emitter> {
    sources
        .iter()
        .flat_map(|s| {
            s.location.vertices().into_iter().map(move |at| Emitter {
                at,
                magnitude: s.magnitude,
                decay_scale: s.decay_scale,
            })
        })
        .collect()
}

fn fill_row(row: &mut [f64], lat: f64, lons: &[f64], emitters: &[Emitter]) {
    for (cell, &lon) in row.iter_mut().zip(lons) {
        let mut acc = 0.0;
        for e in emitters {
            acc += e.influence(lat, lon);
        }
        *cell = acc;
    }
}

/// Raw influence field of `factor` (all zeros when `sources` is empty)
pub fn synthesize_field(factor: Factor, grid: &Grid, sources: &[Source]) -> Field {
    let n = grid.resolution();
    let emitters = emitters(sources);
    let mut cells = vec![0.0; n * n];

    for (row, &lat) in cells.chunks_mut(n).zip(grid.lats()) {
        fill_row(row, lat, grid.lons(), &emitters);
    }

    Field::new(factor, FieldKind::Raw, Raster::from_cells(n, cells))
}

/// `synthesize_field` with grid rows distributed across the rayon pool
pub fn synthesize_field_parallel(factor: Factor, grid: &Grid, sources: &[Source]) -> Field {
    let n = grid.resolution();
    let emitters = emitters(sources);
    let mut cells = vec![0.0; n * n];

    cells
        .par_chunks_mut(n)
        .zip(grid.lats().par_iter())
        .for_each(|(row, &lat)| fill_row(row, lat, grid.lons(), &emitters));

    Field::new(factor, FieldKind::Raw, Raster::from_cells(n, cells))
}

/// Every stage of one factor's field, index-aligned with the grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorLayer {
    pub factor: Factor,
    /// Accumulated influence
    pub raw: Field,
    /// Raw field rescaled into the factor's physical band, if it has one
    pub display: Option<Field>,
    /// [0, 1] values used for score fusion
    pub normalized: Field,
}

impl FactorLayer {
    /// Field in the units shown to users: display band if any, else raw
    pub fn presented(&self) -> &Field {
        self.display.as_ref().unwrap_or(&self.raw)
    }
}

/// Synthesize `factor` and derive its display and fusion normalizations
pub fn synthesize_layer(
    factor: Factor,
    profile: &FactorProfile,
    grid: &Grid,
    sources: &[Source],
    parallel: bool,
) -> FactorLayer {
    let raw = if parallel {
        synthesize_field_parallel(factor, grid, sources)
    } else {
        synthesize_field(factor, grid, sources)
    };

    let display = profile
        .display_range
        .map(|range| normalize_field(&raw, true, Some(range)));

    // Fusion input comes from raw values; the display band never feeds the score
    let normalized = normalize_field(&raw, profile.higher_is_better, None);

    tracing::debug!(
        "Synthesized {} field from {} sources (raw range {:?})",
        factor,
        sources.len(),
        raw.range()
    );

    FactorLayer { factor, raw, display, normalized }
}
