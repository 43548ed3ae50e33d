//! Region Data
//!
//! Typed input records for a scoring region and the built-in Sahel
//! reference dataset (World Bank solar potential per country centroid,
//! population densities, major water bodies, capital cities).
//!
//! Loading these records from tabular files is the caller's concern; the
//! types are serde-deserializable so a loader can hand them over as JSON.

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::factors::{self, Factor, FactorProfile, FactorProfiles};
use crate::sources::{Coord, SourceRegistry};

/// Solar potential at a country centroid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country: String,
    /// Solar power potential (kWh/m²/day)
    pub sun_power: f64,
    pub lat: f64,
    pub lon: f64,
}

impl CountryRecord {
    pub fn coord(&self) -> Coord {
        Coord::new(self.lat, self.lon)
    }
}

/// People per km², joined to `CountryRecord` by country name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationDensity {
    pub country: String,
    pub people_per_km2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaterKind {
    River,
    Lake,
}

/// River or lake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterBody {
    pub name: String,
    pub kind: WaterKind,
    /// Representative point
    pub lat: f64,
    pub lon: f64,
    /// Reach of the water body in degrees (its decay scale)
    pub size: f64,
    /// Sampled course; replaces the representative point when present
    #[serde(default)]
    pub course: Option<Vec<Coord>>,
}

/// Infrastructure hub
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityHub {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Relative infrastructure weight (0-1)
    pub importance: f64,
}

/// City row as shown by the map front-end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Global horizontal irradiance (kWh/m²/day)
    pub ghi: f64,
}

impl CityRecord {
    pub fn coord(&self) -> Coord {
        Coord::new(self.latitude, self.longitude)
    }
}

/// All records needed to populate a `SourceRegistry`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionData {
    #[serde(default)]
    pub countries: Vec<CountryRecord>,
    #[serde(default)]
    pub population: Vec<PopulationDensity>,
    #[serde(default)]
    pub water: Vec<WaterBody>,
    #[serde(default)]
    pub cities: Vec<CityHub>,
    /// Cities to assess against a finished run
    #[serde(default)]
    pub sites: Vec<CityRecord>,
}

impl RegionData {
    /// Built-in Sahel reference dataset
    pub fn sahel() -> Self {
        let countries = [
            ("Senegal", 5.8, 14.5, -14.5),
            ("Mali", 6.1, 17.0, -4.0),
            ("Niger", 6.3, 17.0, 9.0),
            ("Chad", 6.2, 15.0, 19.0),
            ("Burkina Faso", 5.9, 12.0, -2.0),
            ("Mauritania", 6.4, 20.0, -10.0),
            ("Sudan", 6.1, 16.0, 30.0),
        ]
        .into_iter()
        .map(|(country, sun_power, lat, lon)| CountryRecord {
            country: country.to_string(),
            sun_power,
            lat,
            lon,
        })
        .collect();

        let population = [
            ("Senegal", 87.0),
            ("Mali", 17.0),
            ("Niger", 20.0),
            ("Chad", 13.0),
            ("Burkina Faso", 76.0),
            ("Mauritania", 5.0),
            ("Sudan", 25.0),
        ]
        .into_iter()
        .map(|(country, people_per_km2)| PopulationDensity {
            country: country.to_string(),
            people_per_km2,
        })
        .collect();

        let water = [
            ("Senegal River", WaterKind::River, 16.0, -12.0, 3.0),
            ("Niger River", WaterKind::River, 14.0, -6.0, 4.0),
            ("Lake Chad", WaterKind::Lake, 13.0, 14.0, 5.0),
            ("Nile River", WaterKind::River, 15.0, 32.0, 3.0),
        ]
        .into_iter()
        .map(|(name, kind, lat, lon, size)| WaterBody {
            name: name.to_string(),
            kind,
            lat,
            lon,
            size,
            course: None,
        })
        .collect();

        let cities = [
            ("Dakar", 14.69, -17.45, 0.9),
            ("Bamako", 12.65, -8.00, 0.8),
            ("Niamey", 13.51, 2.11, 0.7),
            ("N'Djamena", 12.13, 15.05, 0.6),
            ("Ouagadougou", 12.36, -1.53, 0.7),
        ]
        .into_iter()
        .map(|(name, lat, lon, importance)| CityHub {
            name: name.to_string(),
            lat,
            lon,
            importance,
        })
        .collect();

        RegionData {
            countries,
            population,
            water,
            cities,
            sites: Vec::new(),
        }
    }

    /// Derive every factor's sources, validating each on registration
    pub fn registry(&self, profiles: &FactorProfiles) -> EngineResult<SourceRegistry> {
        let mut registry = SourceRegistry::new();

        for factor in Factor::all() {
            let fallback = factor.default_profile();
            let profile: &FactorProfile = profiles.get(factor).unwrap_or(&fallback);

            let sources = match factor {
                Factor::Sunshine => factors::sunshine::sources(&self.countries, profile),
                Factor::Water => factors::water::sources(&self.water, profile),
                Factor::Population => {
                    factors::population::sources(&self.countries, &self.population, profile)
                }
                Factor::Infrastructure => factors::infrastructure::sources(&self.cities, profile),
            };
            registry.register_all(*factor, sources)?;
        }

        tracing::debug!("Registered {} sources from region data", registry.len());
        Ok(registry)
    }

    /// Countries ordered by solar potential, best first
    pub fn sunshine_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<_> = self
            .countries
            .iter()
            .map(|c| (c.country.as_str(), c.sun_power))
            .collect();
        // Stable sort keeps dataset order for ties
        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::factors::default_profiles;

    #[test]
    fn test_sahel_registry_counts() {
        let data = RegionData::sahel();
        let registry = data.registry(&default_profiles()).unwrap();

        assert_eq!(registry.sources(Factor::Sunshine).len(), 7);
        assert_eq!(registry.sources(Factor::Water).len(), 4);
        assert_eq!(registry.sources(Factor::Population).len(), 7);
        assert_eq!(registry.sources(Factor::Infrastructure).len(), 5);
    }

    #[test]
    fn test_sunshine_ranking() {
        let data = RegionData::sahel();
        let ranking = data.sunshine_ranking();

        assert_eq!(ranking[0], ("Mauritania", 6.4));
        assert_eq!(ranking[1], ("Niger", 6.3));
        // Mali and Sudan tie at 6.1 and keep dataset order
        assert_eq!(ranking[3].0, "Mali");
        assert_eq!(ranking[4].0, "Sudan");
        assert_eq!(ranking.last().unwrap().0, "Senegal");
    }

    #[test]
    fn test_far_flung_course_rejected_by_registry() {
        let mut data = RegionData::sahel();
        data.water.push(WaterBody {
            name: "Runaway".to_string(),
            kind: WaterKind::River,
            lat: 0.0,
            lon: 0.0,
            size: 1.0,
            course: Some(vec![Coord::new(0.0, 0.0), Coord::new(1e200, 0.0)]),
        });

        let err = data.registry(&default_profiles()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidSource { factor: Factor::Water, .. }));
    }

    #[test]
    fn test_region_data_json_defaults() {
        let data: RegionData = serde_json::from_str(
            r#"{"water": [
                {"name": "Oasis", "kind": "lake", "lat": 1.0, "lon": 2.0, "size": 0.5}
            ]}"#,
        )
        .unwrap();

        assert!(data.countries.is_empty());
        assert!(data.sites.is_empty());
        assert_eq!(data.water[0].kind, WaterKind::Lake);
        assert!(data.water[0].course.is_none());
    }
}
