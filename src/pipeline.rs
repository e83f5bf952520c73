use std::path::PathBuf;

use tracing::info;

use crate::config::{AppConfig, RunRequest};
use crate::error::RunError;
use crate::export::{Summary, export_workbook};
use crate::fallback;
use crate::fixtures::{FixtureQuery, list_fixtures};
use crate::http_client::{ApiClient, JsonSource};
use crate::odds::MarketLabels;
use crate::rows::{ExportRow, OddsMode, RowOptions, build_rows};
use crate::teams::resolve_team;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Api,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub source: DataSource,
    pub summary: Summary,
    pub out: PathBuf,
}

/// Fetch, build and export. Nothing is written unless every row was built.
pub fn run(request: &RunRequest, cfg: &AppConfig) -> Result<RunReport, RunError> {
    let (source, rows) = if cfg.has_credentials() {
        let client = ApiClient::new(cfg)?;
        let opts = RowOptions {
            mode: OddsMode::Fetch,
            market: MarketLabels::new(&request.market),
            delay: cfg.odds_delay,
        };
        (DataSource::Api, fetch_rows(&client, request, &opts)?)
    } else {
        info!("No API key found, using sample data (set API_FOOTBALL_KEY in .env for live data)");
        (DataSource::Fallback, load_fallback_rows(request, cfg)?)
    };

    let summary = export_workbook(&request.out, &rows, &request.team, &request.period_label())?;
    Ok(RunReport {
        source,
        summary,
        out: request.out.clone(),
    })
}

pub fn fetch_rows(
    source: &impl JsonSource,
    request: &RunRequest,
    opts: &RowOptions,
) -> Result<Vec<ExportRow>, RunError> {
    info!("Finding team id for '{}' ...", request.team);
    let team_id = resolve_team(source, &request.team)?
        .ok_or_else(|| RunError::TeamNotFound(request.team.clone()))?;
    info!(team_id, "Team resolved");

    let query = FixtureQuery {
        team_id,
        date_from: request.date_from,
        date_to: request.date_to,
        league: request.league.as_deref(),
        season: request.season.as_deref(),
    };
    let fixtures = list_fixtures(source, &query)?;
    info!("Found fixtures: {}", fixtures.len());

    if opts.mode == OddsMode::Fetch {
        info!("Fetching odds (prematch 1x2) ...");
    }
    Ok(build_rows(source, &fixtures, &request.team, opts))
}

fn load_fallback_rows(request: &RunRequest, cfg: &AppConfig) -> Result<Vec<ExportRow>, RunError> {
    if !cfg.fallback_path.exists() {
        return Err(RunError::FallbackMissing(cfg.fallback_path.clone()));
    }
    let rows = fallback::read_rows(&cfg.fallback_path)?;
    Ok(fallback::filter_rows(
        rows,
        &request.team,
        request.date_from,
        request.date_to,
    ))
}
