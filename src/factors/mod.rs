//! Factor modules for site scoring
//!
//! Each factor lives in its own module, owning its default profile and the
//! derivation of `Source`s from region records. The pipeline stages only see
//! `Factor` keys and `FactorProfile` values, so adding a factor means a new
//! variant here plus a new module.

pub mod infrastructure;
pub mod population;
pub mod sunshine;
pub mod water;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Independently scored spatial dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    /// Solar irradiance potential (kWh/m²/day)
    Sunshine,
    /// Proximity to rivers and lakes
    Water,
    /// Population density (lower is better)
    Population,
    /// Proximity to cities and roads
    Infrastructure,
}

impl Factor {
    pub const fn all() -> &'static [Factor] {
        &[
            Factor::Sunshine,
            Factor::Water,
            Factor::Population,
            Factor::Infrastructure,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Factor::Sunshine => "sunshine",
            Factor::Water => "water",
            Factor::Population => "population",
            Factor::Infrastructure => "infrastructure",
        }
    }

    pub fn default_profile(&self) -> FactorProfile {
        match self {
            Factor::Sunshine => sunshine::profile(),
            Factor::Water => water::profile(),
            Factor::Population => population::profile(),
            Factor::Infrastructure => infrastructure::profile(),
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a factor is scored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorProfile {
    /// Share of the composite score (all weights sum to 1)
    pub weight: f64,
    /// False when low raw values are favorable (inverted on normalization)
    pub higher_is_better: bool,
    /// Physical band the raw field is rescaled into for display
    #[serde(default)]
    pub display_range: Option<(f64, f64)>,
    /// Decay scale shared by sources derived from records; `None` when each
    /// record carries its own
    #[serde(default)]
    pub decay_scale: Option<f64>,
}

impl FactorProfile {
    /// Display band must be finite and ascending; a shared decay scale must
    /// be finite and positive
    pub fn validate(&self, factor: Factor) -> EngineResult<()> {
        let reject = |reason: String| EngineError::InvalidProfile { factor, reason };

        if let Some((lo, hi)) = self.display_range {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(reject(format!(
                    "display_range ({}, {}) must be finite with lo < hi",
                    lo, hi
                )));
            }
        }
        if let Some(decay) = self.decay_scale {
            if !(decay.is_finite() && decay > 0.0) {
                return Err(reject(format!(
                    "decay_scale must be finite and > 0, got {}",
                    decay
                )));
            }
        }
        Ok(())
    }
}

/// Profiles keyed by factor
pub type FactorProfiles = BTreeMap<Factor, FactorProfile>;

/// Check every profile's display band and decay scale
pub fn validate_profiles(profiles: &FactorProfiles) -> EngineResult<()> {
    profiles.iter().try_for_each(|(factor, profile)| profile.validate(*factor))
}

/// Default profile of every factor
pub fn default_profiles() -> FactorProfiles {
    Factor::all().iter().map(|f| (*f, f.default_profile())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_weights_sum_to_one() {
        let total: f64 = default_profiles().values().map(|p| p.weight).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_only_population_is_inverted() {
        for factor in Factor::all() {
            let profile = factor.default_profile();
            assert_eq!(profile.higher_is_better, *factor != Factor::Population);
        }
    }

    #[test]
    fn test_default_profiles_validate() {
        assert!(validate_profiles(&default_profiles()).is_ok());
    }

    #[test]
    fn test_bad_display_band_rejected() {
        for range in [(6.5, 4.5), (5.0, 5.0), (4.5, f64::INFINITY), (f64::NAN, 6.5)] {
            let profile = FactorProfile { display_range: Some(range), ..sunshine::profile() };
            assert!(matches!(
                profile.validate(Factor::Sunshine),
                Err(EngineError::InvalidProfile { factor: Factor::Sunshine, .. })
            ));
        }
    }

    #[test]
    fn test_bad_shared_decay_rejected() {
        let mut profiles = default_profiles();
        profiles.get_mut(&Factor::Population).unwrap().decay_scale = Some(0.0);
        assert!(validate_profiles(&profiles).is_err());
    }

    #[test]
    fn test_factor_serde_names() {
        let json = serde_json::to_string(&Factor::Infrastructure).unwrap();
        assert_eq!(json, "\"infrastructure\"");
        assert_eq!(Factor::Water.to_string(), "water");
    }
}
