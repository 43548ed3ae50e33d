//! Engine Configuration
//!
//! JSON configuration for a scoring run. Every section is optional and
//! falls back to the Sahel reference setup:
//!
//! ```json
//! {
//!   "grid": { "lon_min": -18, "lon_max": 40, "lat_min": 10, "lat_max": 20, "resolution": 100 },
//!   "factors": { "sunshine": { "weight": 0.6, "higher_is_better": true,
//!                              "display_range": [4.5, 6.5], "decay_scale": 10 } },
//!   "thresholds": { "okay": 0.1, "good": 0.4, "excellent": 0.7 },
//!   "parallel": true
//! }
//! ```
//!
//! Factors listed under `factors` replace the default profile of that
//! factor; unlisted factors keep their defaults. Weights are validated when
//! the file is loaded.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::combiner::Weights;
use crate::data::RegionData;
use crate::factors::{default_profiles, validate_profiles, FactorProfiles};
use crate::grid::GridSpec;
use crate::zones::ZoneThresholds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub grid: GridSpec,

    #[serde(default = "default_profiles", deserialize_with = "merge_profiles")]
    pub factors: FactorProfiles,

    #[serde(default)]
    pub thresholds: ZoneThresholds,

    /// Synthesize factors on the rayon pool
    #[serde(default)]
    pub parallel: bool,

    /// Region records; the Sahel reference dataset when absent
    #[serde(default)]
    pub region: Option<RegionData>,
}

fn merge_profiles<'de, D>(deserializer: D) -> std::result::Result<FactorProfiles, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let overrides = FactorProfiles::deserialize(deserializer)?;
    let mut profiles = default_profiles();
    profiles.extend(overrides);
    Ok(profiles)
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            grid: GridSpec::default(),
            factors: default_profiles(),
            thresholds: ZoneThresholds::default(),
            parallel: false,
            region: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file and validate its weights
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json(&contents).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).with_context(|| "Failed to parse config JSON")?;
        validate_profiles(&config.factors).with_context(|| "Factor profiles are invalid")?;
        config.weights()?;
        Ok(config)
    }

    /// Weights from the factor profiles
    pub fn weights(&self) -> Result<Weights> {
        Weights::from_profiles(&self.factors).with_context(|| "Factor weights are invalid")
    }

    /// Region records to score (reference dataset by default)
    pub fn region(&self) -> RegionData {
        self.region.clone().unwrap_or_else(RegionData::sahel)
    }
}
