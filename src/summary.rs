//! Run Summary
//!
//! Numeric digest of a scoring run: zone counts and shares, average modeled
//! sunshine, composite score statistics and the country sunshine ranking.

use serde::Serialize;

use crate::data::RegionData;
use crate::factors::Factor;
use crate::scorer::ScoringRun;
use crate::sources::Coord;
use crate::utils::summation::mean;
use crate::zones::{Zone, ZoneCounts};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneShare {
    pub zone: Zone,
    pub cells: usize,
    /// Percentage of all grid cells
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountrySunshine {
    pub country: String,
    pub sun_power: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub resolution: usize,
    pub zone_counts: ZoneCounts,
    /// Best zone first
    pub zone_shares: Vec<ZoneShare>,
    /// Mean of the sunshine field in display units
    pub mean_sunshine: Option<f64>,
    pub mean_score: f64,
    pub best_score: f64,
    /// Location of the best cell (first in row-major order on ties)
    pub best_site: Option<Coord>,
    pub sunshine_ranking: Vec<CountrySunshine>,
}

impl RunSummary {
    pub fn from_run(run: &ScoringRun, region: &RegionData) -> Self {
        let zone_counts = run.zone_counts();
        let zone_shares = Zone::all()
            .iter()
            .rev()
            .map(|&zone| ZoneShare {
                zone,
                cells: zone_counts.get(zone),
                percent: zone_counts.share(zone),
            })
            .collect();

        let mean_sunshine = run
            .layer(Factor::Sunshine)
            .map(|layer| layer.presented().mean());

        let scores = run.scores.cells();
        let resolution = run.scores.resolution();
        let best = scores
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (k, &s)| match best {
                Some((_, b)) if b >= s => best,
                _ => Some((k, s)),
            });

        RunSummary {
            resolution,
            zone_counts,
            zone_shares,
            mean_sunshine,
            mean_score: mean(scores),
            best_score: best.map(|(_, s)| s).unwrap_or(0.0),
            best_site: best.and_then(|(k, _)| run.grid.coord(k / resolution, k % resolution)),
            sunshine_ranking: region
                .sunshine_ranking()
                .into_iter()
                .map(|(country, sun_power)| CountrySunshine {
                    country: country.to_string(),
                    sun_power,
                })
                .collect(),
        }
    }

    /// Emit the digest at info level
    pub fn log(&self) {
        tracing::info!(
            "Run summary ({}x{}): mean score {:.3}, best {:.3}",
            self.resolution,
            self.resolution,
            self.mean_score,
            self.best_score
        );
        if let Some(site) = self.best_site {
            tracing::info!("  Best site near lat {:.2}, lon {:.2}", site.lat, site.lon);
        }
        if let Some(sun) = self.mean_sunshine {
            tracing::info!("  Mean modeled sunshine: {:.2} kWh/m²/day", sun);
        }
        for share in &self.zone_shares {
            tracing::info!(
                "  {:<16} {:>6} cells ({:.1}%)",
                share.zone.display_name(),
                share.cells,
                share.percent
            );
        }
        for (rank, entry) in self.sunshine_ranking.iter().enumerate() {
            tracing::debug!(
                "  #{} {}: {:.1} kWh/m²/day",
                rank + 1,
                entry.country,
                entry.sun_power
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::default_profiles;
    use crate::grid::GridSpec;
    use crate::scorer::SiteScorer;
    use crate::zones::ZoneThresholds;
    use approx::assert_relative_eq;

    fn reference_run(resolution: usize) -> (ScoringRun, RegionData) {
        let region = RegionData::sahel();
        let registry = region.registry(&default_profiles()).unwrap();
        let run = SiteScorer::new(
            GridSpec::sahel(resolution).unwrap(),
            default_profiles(),
            ZoneThresholds::default(),
        )
        .unwrap()
        .score(&registry)
        .unwrap();
        (run, region)
    }

    #[test]
    fn test_counts_cover_grid() {
        let (run, region) = reference_run(25);
        let summary = RunSummary::from_run(&run, &region);

        assert_eq!(summary.zone_counts.total(), 625);
        let cells: usize = summary.zone_shares.iter().map(|s| s.cells).sum();
        assert_eq!(cells, 625);
        let percent: f64 = summary.zone_shares.iter().map(|s| s.percent).sum();
        assert_relative_eq!(percent, 100.0, epsilon = 1e-9);
        assert_eq!(summary.zone_shares[0].zone, Zone::Excellent);
    }

    #[test]
    fn test_score_statistics() {
        let (run, region) = reference_run(25);
        let summary = RunSummary::from_run(&run, &region);

        let max = run.scores.cells().iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(summary.best_score, max);
        assert!(summary.mean_score <= summary.best_score);
        let site = summary.best_site.unwrap();
        assert_eq!(run.score_at(site), max);

        let sun = summary.mean_sunshine.unwrap();
        assert!((4.5..=6.5).contains(&sun));
    }

    #[test]
    fn test_ranking_best_first() {
        let (run, region) = reference_run(5);
        let summary = RunSummary::from_run(&run, &region);

        assert_eq!(summary.sunshine_ranking.len(), 7);
        assert!(summary
            .sunshine_ranking
            .windows(2)
            .all(|w| w[0].sun_power >= w[1].sun_power));
    }
}
