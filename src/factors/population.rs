//! FACTOR: POPULATION DENSITY
//!
//! People cluster around country centers: each centroid emits its density
//! (people/km² ÷ 100) with a 5° decay. Fewer people means easier building,
//! so this factor is inverted during normalization.
//!
//! Densities are joined to country centroids by name; countries without a
//! density row contribute nothing.

use rustc_hash::FxHashMap;

use super::FactorProfile;
use crate::data::{CountryRecord, PopulationDensity};
use crate::sources::Source;

pub const DECAY_SCALE: f64 = 5.0;

/// Divisor turning people/km² into source magnitude
pub const DENSITY_SCALE: f64 = 100.0;

pub fn profile() -> FactorProfile {
    FactorProfile {
        weight: 0.1,
        higher_is_better: false,
        display_range: None,
        decay_scale: Some(DECAY_SCALE),
    }
}

pub fn sources(
    countries: &[CountryRecord],
    densities: &[PopulationDensity],
    profile: &FactorProfile,
) -> Vec<Source> {
    let by_country: FxHashMap<&str, f64> = densities
        .iter()
        .map(|d| (d.country.as_str(), d.people_per_km2))
        .collect();
    let decay = profile.decay_scale.unwrap_or(DECAY_SCALE);

    countries
        .iter()
        .filter_map(|c| {
            let density = by_country.get(c.country.as_str())?;
            Some(Source::point(
                c.country.clone(),
                c.coord(),
                density / DENSITY_SCALE,
                decay,
            ))
        })
        .collect()
}
