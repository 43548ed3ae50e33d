// Region scoring runner
//
// Purpose: Score the reference region (or a JSON-configured one), log the
// summary, and optionally export the run's arrays for a renderer.
// Usage: SITE_SCORER_OUTPUT=run.json cargo run --release --bin score_region

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use site_scorer::{EngineConfig, RunSummary, ScoringRun, SiteAssessment, SiteScorer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Serialize)]
struct RunExport<'a> {
    run: &'a ScoringRun,
    summary: &'a RunSummary,
    sites: Vec<SiteAssessment>,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "site_scorer=info,score_region=info,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration from environment variables
    let config_path = std::env::var("SITE_SCORER_CONFIG").ok().map(PathBuf::from);
    let output_path = std::env::var("SITE_SCORER_OUTPUT").ok().map(PathBuf::from);
    let resolution: Option<usize> = std::env::var("SITE_SCORER_RESOLUTION")
        .ok()
        .map(|r| r.parse())
        .transpose()
        .context("SITE_SCORER_RESOLUTION must be a positive integer")?;
    let parallel: Option<bool> = std::env::var("SITE_SCORER_PARALLEL")
        .ok()
        .map(|p| matches!(p.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

    let mut config = match &config_path {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(resolution) = resolution {
        config.grid = config
            .grid
            .with_resolution(resolution)
            .context("Invalid SITE_SCORER_RESOLUTION")?;
    }
    if let Some(parallel) = parallel {
        config.parallel = parallel;
    }

    tracing::info!("Configuration:");
    tracing::info!("  SITE_SCORER_CONFIG: {:?}", config_path);
    tracing::info!("  Resolution: {}", config.grid.resolution());
    tracing::info!(
        "  Region: lon {:?}, lat {:?}",
        config.grid.lon_range(),
        config.grid.lat_range()
    );
    tracing::info!("  Parallel: {}", config.parallel);

    let scorer = SiteScorer::from_config(&config).context("Failed to initialize scorer")?;
    for (factor, weight) in scorer.weights().iter() {
        tracing::info!("  Weight {}: {}", factor, weight);
    }
    tracing::info!("  Zone thresholds: {:?}", scorer.thresholds().as_array());

    let region = config.region();
    let registry = region
        .registry(&config.factors)
        .context("Failed to register region sources")?;

    let start = Instant::now();
    let run = scorer.score(&registry)?;
    tracing::info!("Scored in {:.1?}", start.elapsed());

    let summary = RunSummary::from_run(&run, &region);
    summary.log();

    let sites: Vec<SiteAssessment> = region.sites.iter().map(|c| run.assess_site(c)).collect();
    for site in &sites {
        tracing::info!(
            "  {} ({}): score {:.3}, {}",
            site.city,
            site.country,
            site.score,
            site.zone
        );
    }

    if let Some(path) = output_path {
        let export = RunExport {
            run: &run,
            summary: &summary,
            sites,
        };
        let json = serde_json::to_string(&export).context("Failed to serialize run")?;
        fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
        tracing::info!("Wrote run to {:?}", path);
    }

    Ok(())
}
