use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use serde_json::{Value, json};

use odds_history::config::RunRequest;
use odds_history::error::{ApiError, RunError};
use odds_history::http_client::JsonSource;
use odds_history::odds::MarketLabels;
use odds_history::pipeline::fetch_rows;
use odds_history::rows::{OddsMode, Outcome, RowOptions, TeamSide};

fn read_fixture(name: &str) -> Value {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    let raw = fs::read_to_string(path).expect("fixture file should be readable");
    serde_json::from_str(&raw).expect("fixture should be valid json")
}

enum OddsReply {
    Files,
    NoCredentials,
    ServerError,
}

struct StubSource {
    teams: Value,
    odds: OddsReply,
    calls: RefCell<Vec<String>>,
}

impl StubSource {
    fn new(odds: OddsReply) -> Self {
        Self {
            teams: read_fixture("teams_search.json"),
            odds,
            calls: RefCell::new(Vec::new()),
        }
    }

    fn odds_calls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("/odds"))
            .count()
    }
}

impl JsonSource for StubSource {
    fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        let param = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        self.calls.borrow_mut().push(format!("{path}?{params:?}"));
        match path {
            "/teams" => Ok(self.teams.clone()),
            "/fixtures" => {
                assert_eq!(param("team"), "42");
                assert_eq!(param("from"), "2024-08-01");
                assert_eq!(param("to"), "2024-08-31");
                assert_eq!(param("status"), "FT,NS,1H,2H,ET,P");
                Ok(read_fixture("fixtures_arsenal.json"))
            }
            "/odds" => {
                assert_eq!(param("type"), "prematch");
                match self.odds {
                    OddsReply::Files if param("fixture") == "5002" => {
                        Ok(read_fixture("odds_5002.json"))
                    }
                    OddsReply::Files => Ok(json!({"response": []})),
                    OddsReply::NoCredentials => Err(ApiError::NoCredentials),
                    OddsReply::ServerError => Err(ApiError::Http {
                        status: 500,
                        snippet: "internal".to_string(),
                    }),
                }
            }
            other => panic!("unexpected path {other}"),
        }
    }
}

fn request() -> RunRequest {
    RunRequest {
        team: "Arsenal".to_string(),
        date_from: NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(),
        date_to: NaiveDate::from_ymd_opt(2024, 8, 31).unwrap(),
        market: "1x2".to_string(),
        league: None,
        season: None,
        out: PathBuf::from("unused.xlsx"),
    }
}

fn opts() -> RowOptions {
    RowOptions {
        mode: OddsMode::Fetch,
        market: MarketLabels::new("1x2"),
        delay: Duration::ZERO,
    }
}

#[test]
fn rows_are_ordered_by_kickoff() {
    let source = StubSource::new(OddsReply::Files);
    let rows = fetch_rows(&source, &request(), &opts()).expect("run succeeds");
    let dates: Vec<_> = rows.iter().map(|r| &r.date_utc[..10]).collect();
    assert_eq!(dates, vec!["2024-08-01", "2024-08-10", "2024-08-20"]);
}

#[test]
fn rows_carry_prematch_odds_and_team_perspective() {
    let source = StubSource::new(OddsReply::Files);
    let rows = fetch_rows(&source, &request(), &opts()).expect("run succeeds");

    let psg = &rows[0];
    assert_eq!(psg.team_side, Some(TeamSide::Away));
    assert_eq!(psg.outcome, Some(Outcome::Draw));
    assert_eq!(psg.odds_home, None);

    // The 14:05 snapshot is after kickoff, so Bwin at 12:30 wins.
    let wolves = &rows[1];
    assert_eq!(wolves.fixture_id, Some(5002));
    assert_eq!(wolves.odds_home, Some(1.36));
    assert_eq!(wolves.odds_draw, Some(5.0));
    assert_eq!(wolves.odds_away, Some(8.0));
    assert_eq!(wolves.team_side, Some(TeamSide::Home));
    assert_eq!(wolves.team_odds, Some(1.36));
    assert_eq!(wolves.outcome, Some(Outcome::Home));

    let villa = &rows[2];
    assert_eq!(villa.outcome, None);
    assert_eq!(villa.status.as_deref(), Some("NS"));
    assert_eq!(source.odds_calls(), 3);
}

#[test]
fn missing_credentials_stop_odds_fetching_but_not_the_run() {
    let source = StubSource::new(OddsReply::NoCredentials);
    let rows = fetch_rows(&source, &request(), &opts()).expect("run succeeds");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.odds_home.is_none()));
    assert_eq!(source.odds_calls(), 1);
}

#[test]
fn odds_http_errors_only_degrade_their_row() {
    let source = StubSource::new(OddsReply::ServerError);
    let rows = fetch_rows(&source, &request(), &opts()).expect("run succeeds");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.team_odds.is_none()));
    assert_eq!(source.odds_calls(), 3);
}

#[test]
fn disabled_mode_makes_no_odds_requests() {
    let source = StubSource::new(OddsReply::Files);
    let opts = RowOptions {
        mode: OddsMode::Disabled,
        ..opts()
    };
    let rows = fetch_rows(&source, &request(), &opts).expect("run succeeds");
    assert_eq!(rows.len(), 3);
    assert_eq!(source.odds_calls(), 0);
}

#[test]
fn league_filter_applies_to_fetched_fixtures() {
    let source = StubSource::new(OddsReply::Files);
    let mut req = request();
    req.league = Some("premier".to_string());
    let rows = fetch_rows(&source, &req, &opts()).expect("run succeeds");
    let ids: Vec<_> = rows.iter().filter_map(|r| r.fixture_id).collect();
    assert_eq!(ids, vec![5002, 5003]);
}

#[test]
fn empty_team_search_is_team_not_found() {
    let mut source = StubSource::new(OddsReply::Files);
    source.teams = json!({"response": []});
    let err = fetch_rows(&source, &request(), &opts()).expect_err("must fail");
    assert!(matches!(err, RunError::TeamNotFound(ref t) if t == "Arsenal"));
    assert_eq!(err.exit_code(), 2);
}
