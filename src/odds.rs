use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::warn;

use crate::error::ApiError;
use crate::http_client::JsonSource;
use crate::timestamps::parse_instant;

const MATCH_WINNER_LABELS: &[&str] = &["match winner", "1x2"];

/// Home/Draw/Away decimal prices; `None` means no usable price.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OddsTriple {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
}

impl OddsTriple {
    pub fn is_empty(&self) -> bool {
        self.home.is_none() && self.draw.is_none() && self.away.is_none()
    }
}

/// Bet names accepted as the match-winner market.
#[derive(Debug, Clone)]
pub struct MarketLabels {
    labels: Vec<String>,
}

impl MarketLabels {
    /// The built-in labels plus `extra` when it names something else.
    pub fn new(extra: &str) -> Self {
        let mut labels: Vec<String> = MATCH_WINNER_LABELS.iter().map(|s| s.to_string()).collect();
        let extra = extra.trim().to_lowercase();
        if !extra.is_empty() && !labels.contains(&extra) {
            labels.push(extra);
        }
        Self { labels }
    }

    pub fn matches(&self, bet_name: &str) -> bool {
        let name = bet_name.to_lowercase();
        self.labels.iter().any(|l| *l == name)
    }
}

impl Default for MarketLabels {
    fn default() -> Self {
        Self::new("")
    }
}

pub fn fetch_prematch_odds(
    source: &impl JsonSource,
    fixture_id: u64,
    kickoff: &str,
    market: &MarketLabels,
) -> Result<OddsTriple, ApiError> {
    let params = [
        ("fixture", fixture_id.to_string()),
        ("type", "prematch".to_string()),
    ];
    let body = source.get_json("/odds", &params)?;
    Ok(select_prematch_odds(&body, kickoff, market))
}

/// Picks the latest bookmaker snapshot taken at or before kickoff.
///
/// Snapshots without a parsable update time, taken after kickoff, or with
/// no usable price at all never qualify. Among equal latest update times
/// the first one seen is kept.
pub fn select_prematch_odds(body: &Value, kickoff: &str, market: &MarketLabels) -> OddsTriple {
    let Some(fixtures) = body.get("response").and_then(|r| r.as_array()) else {
        return OddsTriple::default();
    };
    if fixtures.is_empty() {
        return OddsTriple::default();
    }
    let Some(kickoff_at) = parse_instant(kickoff) else {
        warn!(kickoff, "unparsable kickoff, odds left empty");
        return OddsTriple::default();
    };

    let mut best: Option<(DateTime<Utc>, OddsTriple)> = None;
    for fixture in fixtures {
        for book in array_at(fixture, "bookmakers") {
            let updated = book
                .get("update")
                .and_then(|u| u.as_str())
                .and_then(parse_instant);
            for bet in array_at(book, "bets") {
                let name = bet.get("name").and_then(|n| n.as_str()).unwrap_or_default();
                if !market.matches(name) {
                    continue;
                }
                let Some(updated) = updated else {
                    continue;
                };
                if updated > kickoff_at {
                    continue;
                }
                let triple = extract_triple(bet);
                if triple.is_empty() {
                    continue;
                }
                if best.as_ref().is_none_or(|(at, _)| updated > *at) {
                    best = Some((updated, triple));
                }
            }
        }
    }
    best.map(|(_, triple)| triple).unwrap_or_default()
}

fn extract_triple(bet: &Value) -> OddsTriple {
    let mut out = OddsTriple::default();
    for val in array_at(bet, "values") {
        let label = val
            .get("value")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let price = val.get("odd").and_then(parse_price);
        match label.as_str() {
            "home" | "1" => out.home = price,
            "draw" | "x" => out.draw = price,
            "away" | "2" => out.away = price,
            _ => {}
        }
    }
    out
}

/// Decimal odds arrive as strings ("1.85") or numbers. Zero, negative and
/// non-finite values are not real prices.
fn parse_price(raw: &Value) -> Option<f64> {
    let price = match raw {
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    (price.is_finite() && price > 0.0).then_some(price)
}

fn array_at<'a>(v: &'a Value, key: &str) -> &'a [Value] {
    v.get(key)
        .and_then(|x| x.as_array())
        .map(|a| a.as_slice())
        .unwrap_or(&[])
}
