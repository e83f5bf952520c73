use std::thread;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::fixtures::Fixture;
use crate::http_client::JsonSource;
use crate::odds::{MarketLabels, OddsTriple, fetch_prematch_odds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "H")]
    Home,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "A")]
    Away,
}

impl Outcome {
    pub fn from_score(home: Option<u32>, away: Option<u32>) -> Option<Self> {
        let (home, away) = (home?, away?);
        Some(match home.cmp(&away) {
            std::cmp::Ordering::Greater => Outcome::Home,
            std::cmp::Ordering::Less => Outcome::Away,
            std::cmp::Ordering::Equal => Outcome::Draw,
        })
    }

    pub fn code(self) -> &'static str {
        match self {
            Outcome::Home => "H",
            Outcome::Draw => "D",
            Outcome::Away => "A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn label(self) -> &'static str {
        match self {
            TeamSide::Home => "Home",
            TeamSide::Away => "Away",
        }
    }

    /// The outcome that means this side won.
    pub fn winning_outcome(self) -> Outcome {
        match self {
            TeamSide::Home => Outcome::Home,
            TeamSide::Away => Outcome::Away,
        }
    }
}

/// One spreadsheet row per fixture. Serde names are the sheet headers, so
/// the same type reads the fallback CSV.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "DateUTC")]
    pub date_utc: String,
    #[serde(rename = "League")]
    pub league: Option<String>,
    #[serde(rename = "Season", default, deserialize_with = "whole_number")]
    pub season: Option<i32>,
    #[serde(rename = "Round")]
    pub round: Option<String>,
    #[serde(rename = "Home")]
    pub home: Option<String>,
    #[serde(rename = "Away")]
    pub away: Option<String>,
    #[serde(rename = "Kickoff_Timestamp", default, deserialize_with = "whole_number")]
    pub kickoff_timestamp: Option<i64>,
    #[serde(rename = "FixtureID", default, deserialize_with = "whole_number")]
    pub fixture_id: Option<u64>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "HomeGoals", default, deserialize_with = "whole_number")]
    pub home_goals: Option<u32>,
    #[serde(rename = "AwayGoals", default, deserialize_with = "whole_number")]
    pub away_goals: Option<u32>,
    #[serde(rename = "Outcome")]
    pub outcome: Option<Outcome>,
    #[serde(rename = "Odds_H")]
    pub odds_home: Option<f64>,
    #[serde(rename = "Odds_D")]
    pub odds_draw: Option<f64>,
    #[serde(rename = "Odds_A")]
    pub odds_away: Option<f64>,
    #[serde(rename = "TeamSide")]
    pub team_side: Option<TeamSide>,
    #[serde(rename = "TeamOdds")]
    pub team_odds: Option<f64>,
}

/// Integer cells that may have been written as floats (`2.0`) by
/// spreadsheet tools; fractional values are rejected.
fn whole_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let n = match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let f = raw
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("not a number: {raw}")))?;
            if !f.is_finite() || f.fract() != 0.0 || f.abs() > i64::MAX as f64 {
                return Err(D::Error::custom(format!("not a whole number: {raw}")));
            }
            f as i64
        }
    };
    T::try_from(n)
        .map(Some)
        .map_err(|_| D::Error::custom(format!("out of range: {raw}")))
}

pub const COLUMNS: [&str; 17] = [
    "DateUTC",
    "League",
    "Season",
    "Round",
    "Home",
    "Away",
    "Kickoff_Timestamp",
    "FixtureID",
    "Status",
    "HomeGoals",
    "AwayGoals",
    "Outcome",
    "Odds_H",
    "Odds_D",
    "Odds_A",
    "TeamSide",
    "TeamOdds",
];

pub fn team_side(home: Option<&str>, away: Option<&str>, team: &str) -> Option<TeamSide> {
    let wanted = team.to_lowercase();
    if home.is_some_and(|h| h.to_lowercase() == wanted) {
        Some(TeamSide::Home)
    } else if away.is_some_and(|a| a.to_lowercase() == wanted) {
        Some(TeamSide::Away)
    } else {
        None
    }
}

pub fn build_row(fixture: &Fixture, odds: OddsTriple, team: &str) -> ExportRow {
    let side = team_side(fixture.home.as_deref(), fixture.away.as_deref(), team);
    let team_odds = side.and_then(|s| match s {
        TeamSide::Home => odds.home,
        TeamSide::Away => odds.away,
    });

    ExportRow {
        date_utc: fixture.kickoff.clone(),
        league: fixture.league.clone(),
        season: fixture.season,
        round: fixture.round.clone(),
        home: fixture.home.clone(),
        away: fixture.away.clone(),
        kickoff_timestamp: fixture.timestamp,
        fixture_id: fixture.id,
        status: fixture.status.clone(),
        home_goals: fixture.home_goals,
        away_goals: fixture.away_goals,
        outcome: Outcome::from_score(fixture.home_goals, fixture.away_goals),
        odds_home: odds.home,
        odds_draw: odds.draw,
        odds_away: odds.away,
        team_side: side,
        team_odds,
    }
}

/// Whether odds are requested for the fixtures of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OddsMode {
    Fetch,
    Disabled,
}

#[derive(Debug, Clone)]
pub struct RowOptions {
    pub mode: OddsMode,
    pub market: MarketLabels,
    /// Pause after each odds request.
    pub delay: Duration,
}

/// Builds one row per fixture, fetching odds sequentially.
///
/// A `NoCredentials` failure switches the rest of the pass to `Disabled`;
/// any other odds failure leaves that fixture without odds.
pub fn build_rows(
    source: &impl JsonSource,
    fixtures: &[Fixture],
    team: &str,
    opts: &RowOptions,
) -> Vec<ExportRow> {
    let mut mode = opts.mode;
    let mut rows = Vec::with_capacity(fixtures.len());

    for fixture in fixtures {
        let mut odds = OddsTriple::default();
        if let (OddsMode::Fetch, Some(id)) = (mode, fixture.id) {
            match fetch_prematch_odds(source, id, &fixture.kickoff, &opts.market) {
                Ok(triple) => {
                    odds = triple;
                    if !opts.delay.is_zero() {
                        thread::sleep(opts.delay);
                    }
                }
                Err(ApiError::NoCredentials) => {
                    info!("no API key for odds, continuing without odds");
                    mode = OddsMode::Disabled;
                }
                Err(err) => warn!(fixture_id = id, "odds not fetched: {err}"),
            }
        }
        rows.push(build_row(fixture, odds, team));
    }
    rows
}
