use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use odds_history::config::{AppConfig, DEFAULT_MARKET, DEFAULT_OUTPUT, RunRequest};
use odds_history::pipeline::{self, DataSource};

/// Export a team's match history with pre-match odds to Excel.
#[derive(Parser, Debug)]
#[command(name = "odds_history")]
struct Cli {
    /// Team name in plain text, e.g. "Arsenal"
    #[arg(long)]
    team: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long = "from")]
    date_from: NaiveDate,

    /// End date, inclusive (YYYY-MM-DD)
    #[arg(long = "to")]
    date_to: NaiveDate,

    /// Odds market (match winner)
    #[arg(long, default_value = DEFAULT_MARKET)]
    market: String,

    /// League name filter, e.g. "Premier League"
    #[arg(long)]
    league: Option<String>,

    /// Season, e.g. 2024
    #[arg(long)]
    season: Option<String>,

    /// Output Excel filename
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    out: PathBuf,
}

impl Cli {
    fn into_request(self) -> RunRequest {
        RunRequest {
            team: self.team.trim().to_string(),
            date_from: self.date_from,
            date_to: self.date_to,
            market: self.market,
            league: self.league,
            season: self.season,
            out: self.out,
        }
    }
}

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let request = Cli::parse().into_request();
    let cfg = AppConfig::from_env();

    match pipeline::run(&request, &cfg) {
        Ok(report) => {
            let source = match report.source {
                DataSource::Api => "api",
                DataSource::Fallback => "sample data",
            };
            info!(
                matches = report.summary.matches,
                source,
                "Saved Excel to {}",
                report.out.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
