//! Territory replay - feeds a recorded GPS track through a claim session
//!
//! Usage:
//!   cargo run --bin territory_replay -- --track walk.json --confirm --sites sites.json

use clap::Parser;
use serde_json::json;
use std::path::{Path, PathBuf};

use territory_claim::claim::{ConfirmedTerritory, TerritoryClaimSession};
use territory_claim::core::error::Result;
use territory_claim::core::{now_timestamp, ClaimConfig, GeoPoint};
use territory_claim::tracking::TrackingState;
use territory_claim::validation::{PlacementValidator, ValidationResult};

#[derive(Parser, Debug)]
#[command(name = "territory_replay")]
#[command(about = "Replay a recorded GPS track through the territory claim engine")]
struct Args {
    /// JSON array of fixes: {latitude, longitude, horizontal_accuracy?, timestamp?}
    #[arg(long)]
    track: PathBuf,

    /// TOML file overriding the default tunables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Confirm a validated claim and print the territory as JSON
    #[arg(long, default_value_t = false)]
    confirm: bool,

    /// JSON array of candidate build sites (requires --confirm)
    #[arg(long)]
    sites: Option<PathBuf>,

    /// Placement clearance in metres (defaults to the config value)
    #[arg(long)]
    clearance: Option<f64>,

    /// Stop at the first failed closure instead of resuming tracking
    #[arg(long, default_value_t = false)]
    stop_on_failure: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("territory_claim=info,territory_replay=info")
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ClaimConfig::load(path)?,
        None => ClaimConfig::default(),
    };
    let fixes = read_points(&args.track)?;
    tracing::info!("Replaying {} fixes from {}", fixes.len(), args.track.display());

    let mut session = TerritoryClaimSession::new(&config);
    // Untimestamped leading fixes are timed from the earliest recorded fix
    let start = fixes
        .iter()
        .filter_map(|f| f.timestamp)
        .reduce(f64::min)
        .unwrap_or_else(now_timestamp);
    session.begin_claim_at(start)?;

    for fix in fixes {
        if session.state() != TrackingState::Tracking {
            break;
        }
        let outcome = session.submit_sample(fix)?;

        if let Some(warning) = outcome.warning {
            tracing::warn!(
                "Fix #{}: {} (shown for {:.1}s)",
                outcome.sample.sequence,
                warning.message(),
                warning.display_for.as_secs_f64()
            );
        }

        if let Some(ValidationResult::Failed(reason)) = outcome.validation {
            tracing::warn!("Closure rejected: {}. {}", reason, reason.hint());
            if !args.stop_on_failure {
                session.resume_tracking()?;
            }
        }
    }

    let stats = session.tracking().stats();
    tracing::info!(
        "Final state {:?}: {} accepted, {} jitter, {} rejected, {:.1} m walked",
        session.state(),
        stats.accepted,
        stats.jitter,
        stats.rejected(),
        session.tracking().path_length_m()
    );

    match session.last_validation() {
        Some(ValidationResult::Passed { area_m2, perimeter_m }) => {
            tracing::info!("Claim ready: {:.1} m², perimeter {:.1} m", area_m2, perimeter_m);
        }
        Some(ValidationResult::Failed(reason)) => {
            tracing::info!("Claim failed: {}", reason);
        }
        None => tracing::info!("Path never closed"),
    }

    if !args.confirm || session.state() != TrackingState::Validated {
        return Ok(());
    }

    let territory = session.confirm_and_extract()?;
    println!("{}", serde_json::to_string_pretty(&territory)?);

    if let Some(sites_path) = &args.sites {
        let clearance = args.clearance.unwrap_or(config.default_placement_clearance_m);
        report_sites(&territory, &read_points(sites_path)?, clearance)?;
    }

    Ok(())
}

fn read_points(path: &Path) -> Result<Vec<GeoPoint>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn report_sites(territory: &ConfirmedTerritory, sites: &[GeoPoint], clearance_m: f64) -> Result<()> {
    let validator = PlacementValidator::with_clearance(clearance_m);
    let verdicts = validator.check_sites(sites, territory);

    let report: Vec<_> = sites
        .iter()
        .zip(&verdicts)
        .map(|(site, verdict)| json!({ "site": site, "placement": verdict }))
        .collect();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
