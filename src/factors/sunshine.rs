//! FACTOR: SUNSHINE (SOLAR POTENTIAL)
//!
//! Each country centroid emits its solar power potential with a wide decay
//! (10°), so the field blends neighbouring national figures.
//!
//! After accumulation the field is rescaled onto the 4.5-6.5 kWh/m²/day band
//! using its own min/max. This is a relative rescale presented in physical
//! units, kept so displayed magnitudes match the reference maps.

use super::FactorProfile;
use crate::data::CountryRecord;
use crate::sources::Source;

/// Physical display band (kWh/m²/day)
pub const DISPLAY_RANGE: (f64, f64) = (4.5, 6.5);

/// Influence radius of a country centroid (degrees)
pub const DECAY_SCALE: f64 = 10.0;

pub fn profile() -> FactorProfile {
    FactorProfile {
        weight: 0.6,
        higher_is_better: true,
        display_range: Some(DISPLAY_RANGE),
        decay_scale: Some(DECAY_SCALE),
    }
}

/// One point source per country, magnitude = solar potential
pub fn sources(countries: &[CountryRecord], profile: &FactorProfile) -> Vec<Source> {
    let decay = profile.decay_scale.unwrap_or(DECAY_SCALE);
    countries
        .iter()
        .map(|c| Source::point(c.country.clone(), c.coord(), c.sun_power, decay))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::RegionData;

    #[test]
    fn test_country_sources() {
        let data = RegionData::sahel();
        let sources = sources(&data.countries, &profile());

        let niger = sources.iter().find(|s| s.name == "Niger").unwrap();
        assert_eq!(niger.magnitude, 6.3);
        assert_eq!(niger.decay_scale, 10.0);
    }
}
