//! Zone Classification
//!
//! Buckets composite scores into ordered suitability zones using half-open
//! thresholds (defaults 0.1 / 0.4 / 0.7):
//!
//! | score                    | zone          |
//! |--------------------------|---------------|
//! | > excellent              | 3 (Excellent) |
//! | (good, excellent]        | 2 (Good)      |
//! | (okay, good]             | 1 (Okay)      |
//! | ≤ okay, or NaN           | 0 (None)      |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::field::ScoreMap;
use crate::grid::Raster;

/// Suitability bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Zone {
    /// Not recommended
    None = 0,
    Okay = 1,
    Good = 2,
    Excellent = 3,
}

impl Zone {
    pub const fn all() -> [Zone; 4] {
        [Zone::None, Zone::Okay, Zone::Good, Zone::Excellent]
    }

    pub fn from_code(code: u8) -> Option<Zone> {
        match code {
            0 => Some(Zone::None),
            1 => Some(Zone::Okay),
            2 => Some(Zone::Good),
            3 => Some(Zone::Excellent),
            _ => None,
        }
    }

    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Friendly name for display
    pub fn display_name(&self) -> &'static str {
        match self {
            Zone::None => "Not Recommended",
            Zone::Okay => "Okay",
            Zone::Good => "Good",
            Zone::Excellent => "Excellent",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lower bounds (exclusive) of the okay, good and excellent zones
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ThresholdBounds")]
pub struct ZoneThresholds {
    okay: f64,
    good: f64,
    excellent: f64,
}

#[derive(Debug, Deserialize)]
struct ThresholdBounds {
    okay: f64,
    good: f64,
    excellent: f64,
}

impl TryFrom<ThresholdBounds> for ZoneThresholds {
    type Error = EngineError;

    fn try_from(b: ThresholdBounds) -> EngineResult<Self> {
        ZoneThresholds::new(b.okay, b.good, b.excellent)
    }
}

impl Default for ZoneThresholds {
    fn default() -> Self {
        ZoneThresholds { okay: 0.1, good: 0.4, excellent: 0.7 }
    }
}

impl ZoneThresholds {
    /// Thresholds must be finite, within [0, 1] and strictly ascending
    pub fn new(okay: f64, good: f64, excellent: f64) -> EngineResult<Self> {
        let all = [okay, good, excellent];
        if all.iter().any(|t| !t.is_finite() || !(0.0..=1.0).contains(t)) {
            return Err(EngineError::thresholds(format!(
                "thresholds {:?} must lie within [0, 1]",
                all
            )));
        }
        if !(okay < good && good < excellent) {
            return Err(EngineError::thresholds(format!(
                "thresholds {:?} must be strictly ascending",
                all
            )));
        }
        Ok(ZoneThresholds { okay, good, excellent })
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.okay, self.good, self.excellent]
    }

    pub fn classify(&self, score: f64) -> Zone {
        if score > self.excellent {
            Zone::Excellent
        } else if score > self.good {
            Zone::Good
        } else if score > self.okay {
            Zone::Okay
        } else {
            // Also catches NaN: every comparison above is false
            Zone::None
        }
    }
}

impl TryFrom<[f64; 3]> for ZoneThresholds {
    type Error = EngineError;

    fn try_from(t: [f64; 3]) -> EngineResult<Self> {
        ZoneThresholds::new(t[0], t[1], t[2])
    }
}

/// Zone code per cell (0-3), aligned with the score map
pub type ZoneMap = Raster<u8>;

/// Classify every cell of `scores`
///
/// `thresholds` are the okay, good and excellent bounds in that order.
pub fn classify_zones(scores: &ScoreMap, thresholds: [f64; 3]) -> EngineResult<ZoneMap> {
    let thresholds = ZoneThresholds::try_from(thresholds)?;
    Ok(classify_with(scores, &thresholds))
}

/// Classify with already validated thresholds
pub fn classify_with(scores: &ScoreMap, thresholds: &ZoneThresholds) -> ZoneMap {
    scores.map(|&s| thresholds.classify(s).code())
}

/// Cells per zone
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneCounts {
    pub none: usize,
    pub okay: usize,
    pub good: usize,
    pub excellent: usize,
}

impl ZoneCounts {
    pub fn tally(zones: &ZoneMap) -> Self {
        let mut counts = ZoneCounts::default();
        for &code in zones.cells() {
            match Zone::from_code(code) {
                Some(Zone::Okay) => counts.okay += 1,
                Some(Zone::Good) => counts.good += 1,
                Some(Zone::Excellent) => counts.excellent += 1,
                _ => counts.none += 1,
            }
        }
        counts
    }

    pub fn get(&self, zone: Zone) -> usize {
        match zone {
            Zone::None => self.none,
            Zone::Okay => self.okay,
            Zone::Good => self.good,
            Zone::Excellent => self.excellent,
        }
    }

    pub fn total(&self) -> usize {
        self.none + self.okay + self.good + self.excellent
    }

    /// Percentage of all cells in `zone` (0 for an empty map)
    pub fn share(&self, zone: Zone) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(zone) as f64 / total as f64 * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_open_boundaries() {
        let t = ZoneThresholds::default();

        assert_eq!(t.classify(0.71), Zone::Excellent);
        assert_eq!(t.classify(0.70), Zone::Good);
        assert_eq!(t.classify(0.41), Zone::Good);
        assert_eq!(t.classify(0.40), Zone::Okay);
        assert_eq!(t.classify(0.11), Zone::Okay);
        assert_eq!(t.classify(0.10), Zone::None);
        assert_eq!(t.classify(0.0), Zone::None);
        assert_eq!(t.classify(f64::NAN), Zone::None);
    }

    #[test]
    fn test_classify_map() {
        let scores = Raster::try_from(vec![vec![0.05, 0.25], vec![0.55, 0.95]]).unwrap();
        let zones = classify_zones(&scores, [0.1, 0.4, 0.7]).unwrap();

        assert_eq!(zones.to_rows(), vec![vec![0, 1], vec![2, 3]]);

        let counts = ZoneCounts::tally(&zones);
        assert_eq!(counts.total(), 4);
        assert_eq!(counts.share(Zone::Excellent), 25.0);
    }

    #[test]
    fn test_custom_thresholds_shift_zones() {
        let scores = Raster::filled(2, 0.5);
        let strict = classify_zones(&scores, [0.2, 0.5, 0.8]).unwrap();
        assert!(strict.cells().iter().all(|&z| z == Zone::Okay.code()));
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(matches!(
            classify_zones(&Raster::filled(2, 0.5), [0.4, 0.1, 0.7]),
            Err(EngineError::InvalidThresholds { .. })
        ));
        assert!(ZoneThresholds::new(0.1, 0.4, 1.5).is_err());
        assert!(ZoneThresholds::new(0.1, 0.1, 0.7).is_err());
        let unordered = r#"{"okay": 0.5, "good": 0.4, "excellent": 0.7}"#;
        assert!(serde_json::from_str::<ZoneThresholds>(unordered).is_err());
    }
}
