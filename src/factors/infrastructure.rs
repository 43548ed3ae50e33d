//! FACTOR: INFRASTRUCTURE (CITIES & ROADS)
//!
//! Major cities emit their importance with a tight 3° decay: existing roads
//! and services thin out quickly away from urban hubs.

use super::FactorProfile;
use crate::data::CityHub;
use crate::sources::{Coord, Source};

pub const DECAY_SCALE: f64 = 3.0;

pub fn profile() -> FactorProfile {
    FactorProfile {
        weight: 0.1,
        higher_is_better: true,
        display_range: None,
        decay_scale: Some(DECAY_SCALE),
    }
}

pub fn sources(cities: &[CityHub], profile: &FactorProfile) -> Vec<Source> {
    let decay = profile.decay_scale.unwrap_or(DECAY_SCALE);
    cities
        .iter()
        .map(|c| Source::point(c.name.clone(), Coord::new(c.lat, c.lon), c.importance, decay))
        .collect()
}
