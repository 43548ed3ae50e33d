//! Factor-tagged rasters
//!
//! `Field` is the unit passed between the synthesizer, the normalizer and
//! the combiner. `ScoreMap` is the fused composite.

use serde::{Deserialize, Serialize};

use crate::factors::Factor;
use crate::grid::Raster;

/// Processing stage of a field's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Accumulated source influence, unnormalized
    Raw,
    /// Rescaled into a factor's physical display range
    Display,
    /// Min-max normalized to [0, 1], inverted if lower is better
    Normalized,
}

/// Grid-aligned values for one factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub factor: Factor,
    pub kind: FieldKind,
    pub values: Raster<f64>,
}

impl Field {
    pub fn new(factor: Factor, kind: FieldKind, values: Raster<f64>) -> Self {
        Field { factor, kind, values }
    }

    pub fn resolution(&self) -> usize {
        self.values.resolution()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i, j).copied()
    }

    /// (min, max) over finite cells; `None` when there are none
    pub fn range(&self) -> Option<(f64, f64)> {
        crate::utils::normalization::finite_range(self.values.cells())
    }

    pub fn mean(&self) -> f64 {
        crate::utils::summation::mean(self.values.cells())
    }
}

/// Weighted composite score per cell, in [0, 1]
pub type ScoreMap = Raster<f64>;
