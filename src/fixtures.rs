use chrono::NaiveDate;
use serde_json::Value;

use crate::error::ApiError;
use crate::http_client::JsonSource;

/// Completed plus scheduled and in-progress states.
pub const STATUS_FILTER: &str = "FT,NS,1H,2H,ET,P";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixture {
    pub id: Option<u64>,
    /// ISO-8601 kickoff as sent by the API; empty when missing.
    pub kickoff: String,
    pub timestamp: Option<i64>,
    pub league: Option<String>,
    pub season: Option<i32>,
    pub round: Option<String>,
    pub home: Option<String>,
    pub away: Option<String>,
    pub status: Option<String>,
    pub home_goals: Option<u32>,
    pub away_goals: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct FixtureQuery<'a> {
    pub team_id: u64,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub league: Option<&'a str>,
    pub season: Option<&'a str>,
}

pub fn list_fixtures(
    source: &impl JsonSource,
    query: &FixtureQuery<'_>,
) -> Result<Vec<Fixture>, ApiError> {
    let mut params = vec![
        ("team", query.team_id.to_string()),
        ("from", query.date_from.format("%Y-%m-%d").to_string()),
        ("to", query.date_to.format("%Y-%m-%d").to_string()),
        ("status", STATUS_FILTER.to_string()),
    ];
    if let Some(season) = query.season.filter(|s| !s.trim().is_empty()) {
        params.push(("season", season.trim().to_string()));
    }
    let body = source.get_json("/fixtures", &params)?;
    Ok(fixtures_from_response(&body, query.league))
}

/// Parses, league-filters and orders a `/fixtures` response.
pub fn fixtures_from_response(body: &Value, league_filter: Option<&str>) -> Vec<Fixture> {
    let mut out: Vec<Fixture> = body
        .get("response")
        .and_then(|r| r.as_array())
        .map(|items| items.iter().map(parse_fixture).collect())
        .unwrap_or_default();

    if let Some(filter) = league_filter.filter(|f| !f.is_empty()) {
        let needle = filter.to_lowercase();
        out.retain(|f| {
            f.league
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&needle)
        });
    }

    // Plain string order on the ISO kickoff; missing dates sort first.
    out.sort_by(|a, b| a.kickoff.cmp(&b.kickoff));
    out
}

pub fn parse_fixture(v: &Value) -> Fixture {
    let fixture = v.get("fixture");
    let league = v.get("league");
    let teams = v.get("teams");
    let goals = v.get("goals");

    let str_at = |node: Option<&Value>, key: &str| {
        node.and_then(|n| n.get(key))
            .and_then(|x| x.as_str())
            .map(|s| s.to_string())
    };
    let team_name = |side: &str| {
        teams
            .and_then(|t| t.get(side))
            .and_then(|t| t.get("name"))
            .and_then(|x| x.as_str())
            .map(|s| s.to_string())
    };
    let goal = |side: &str| {
        goals
            .and_then(|g| g.get(side))
            .and_then(|x| x.as_u64())
            .map(|n| n as u32)
    };

    Fixture {
        id: fixture.and_then(|f| f.get("id")).and_then(|x| x.as_u64()),
        kickoff: str_at(fixture, "date").unwrap_or_default(),
        timestamp: fixture
            .and_then(|f| f.get("timestamp"))
            .and_then(|x| x.as_i64()),
        league: str_at(league, "name"),
        season: league
            .and_then(|l| l.get("season"))
            .and_then(|x| x.as_i64())
            .map(|n| n as i32),
        round: str_at(league, "round"),
        home: team_name("home"),
        away: team_name("away"),
        status: fixture
            .and_then(|f| f.get("status"))
            .and_then(|s| s.get("short"))
            .and_then(|x| x.as_str())
            .map(|s| s.to_string()),
        home_goals: goal("home"),
        away_goals: goal("away"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn item(id: u64, date: &str, league: &str) -> Value {
        json!({
            "fixture": {"id": id, "date": date, "timestamp": 0, "status": {"short": "FT"}},
            "league": {"name": league, "season": 2024, "round": "Regular Season - 1"},
            "teams": {"home": {"name": "Arsenal"}, "away": {"name": "Wolves"}},
            "goals": {"home": 2, "away": 0}
        })
    }

    #[test]
    fn league_filter_is_case_insensitive_substring() {
        let body = json!({"response": [
            item(1, "2024-08-17T14:00:00+00:00", "Premier League"),
            item(2, "2024-08-18T14:00:00+00:00", "Premier League 2"),
            item(3, "2024-08-19T14:00:00+00:00", "FA Cup"),
        ]});
        let out = fixtures_from_response(&body, Some("premier league"));
        let ids: Vec<_> = out.iter().filter_map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let body = json!({"response": [item(1, "2024-08-17", "FA Cup")]});
        assert_eq!(fixtures_from_response(&body, Some("")).len(), 1);
        assert_eq!(fixtures_from_response(&body, None).len(), 1);
    }

    #[test]
    fn sorted_by_kickoff_string_with_missing_first() {
        let mut no_date = item(9, "", "Premier League");
        no_date["fixture"].as_object_mut().unwrap().remove("date");
        let body = json!({"response": [
            item(1, "2024-08-20T14:00:00+00:00", "Premier League"),
            no_date,
            item(2, "2024-08-01T14:00:00+00:00", "Premier League"),
        ]});
        let out = fixtures_from_response(&body, None);
        let ids: Vec<_> = out.iter().filter_map(|f| f.id).collect();
        assert_eq!(ids, vec![9, 2, 1]);
        assert_eq!(out[0].kickoff, "");
    }

    #[test]
    fn missing_fields_become_absent_not_dropped() {
        let f = parse_fixture(&json!({"fixture": {"id": 5}}));
        assert_eq!(f.id, Some(5));
        assert!(f.home.is_none());
        assert!(f.home_goals.is_none());
        assert_eq!(f.kickoff, "");
    }

    #[test]
    fn null_goals_stay_absent() {
        let mut v = item(1, "2024-08-17", "Premier League");
        v["goals"] = json!({"home": null, "away": null});
        let f = parse_fixture(&v);
        assert_eq!(f.home_goals, None);
        assert_eq!(f.season, Some(2024));
        assert_eq!(f.status.as_deref(), Some("FT"));
    }
}
