//! Score Combiner
//!
//! Weighted linear fusion of normalized factor fields:
//! `score(i,j) = Σ_f weight[f] × normalized[f](i,j)`.
//!
//! Weights are validated once, on construction. They are never
//! renormalized: a set that does not sum to 1 is rejected.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::factors::{Factor, FactorProfiles};
use crate::field::{Field, ScoreMap};
use crate::grid::Raster;
use crate::utils::summation::NeumaierSum;

/// Allowed deviation of the weight total from 1
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Validated non-negative weights summing to 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Factor, f64>", into = "BTreeMap<Factor, f64>")]
pub struct Weights(BTreeMap<Factor, f64>);

impl Weights {
    pub fn new(weights: BTreeMap<Factor, f64>) -> EngineResult<Self> {
        if weights.is_empty() {
            return Err(EngineError::weights("no factors weighted"));
        }
        for (factor, &w) in &weights {
            if !w.is_finite() || w < 0.0 {
                return Err(EngineError::weights(format!(
                    "weight for {} must be finite and >= 0, got {}",
                    factor, w
                )));
            }
        }
        let total: f64 = weights.values().sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(EngineError::weights(format!(
                "weights sum to {}, expected 1",
                total
            )));
        }
        Ok(Weights(weights))
    }

    /// Weights taken from each profile
    pub fn from_profiles(profiles: &FactorProfiles) -> EngineResult<Self> {
        Weights::new(profiles.iter().map(|(f, p)| (*f, p.weight)).collect())
    }

    pub fn get(&self, factor: Factor) -> Option<f64> {
        self.0.get(&factor).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Factor, f64)> + '_ {
        self.0.iter().map(|(f, w)| (*f, *w))
    }

    /// Fail unless exactly the factors in `factors` are weighted
    pub fn check_covers(&self, factors: impl IntoIterator<Item = Factor>) -> EngineResult<()> {
        let present: BTreeSet<Factor> = factors.into_iter().collect();
        if let Some(missing) = present.iter().find(|f| !self.0.contains_key(*f)) {
            return Err(EngineError::weights(format!("missing weight for {}", missing)));
        }
        let extra: Vec<&str> = self
            .0
            .keys()
            .filter(|f| !present.contains(*f))
            .map(Factor::name)
            .collect();
        if !extra.is_empty() {
            return Err(EngineError::weights(format!(
                "weights name factors without fields: {:?}",
                extra
            )));
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<Factor, f64>> for Weights {
    type Error = EngineError;

    fn try_from(map: BTreeMap<Factor, f64>) -> EngineResult<Self> {
        Weights::new(map)
    }
}

impl From<Weights> for BTreeMap<Factor, f64> {
    fn from(w: Weights) -> Self {
        w.0
    }
}

/// Fuse normalized fields into a composite score map
///
/// The weighted factors must match the fields exactly, and every field must
/// share one resolution. Cells are summed with compensation in factor order
/// and clamped to [0, 1] to absorb sub-epsilon overshoot.
pub fn combine_scores(
    fields: &BTreeMap<Factor, Field>,
    weights: &Weights,
) -> EngineResult<ScoreMap> {
    weights.check_covers(fields.keys().copied())?;

    let resolution = fields
        .values()
        .next()
        .map(Field::resolution)
        .ok_or_else(|| EngineError::weights("no fields to combine"))?;
    if let Some(bad) = fields.values().find(|f| f.resolution() != resolution) {
        return Err(EngineError::ShapeMismatch {
            expected: resolution,
            found: bad.resolution(),
        });
    }

    let weighted: Vec<(f64, &[f64])> = fields
        .iter()
        .map(|(factor, field)| (weights.get(*factor).unwrap_or(0.0), field.values.cells()))
        .collect();

    let cells = (0..resolution * resolution)
        .map(|k| {
            let mut acc = NeumaierSum::new();
            for (w, values) in &weighted {
                acc.add(w * values[k]);
            }
            acc.total().clamp(0.0, 1.0)
        })
        .collect();

    Ok(Raster::from_cells(resolution, cells))
}
