use serde_json::Value;

use crate::error::ApiError;
use crate::http_client::JsonSource;

/// Looks a team up by free-text name.
///
/// An exact case-insensitive name match wins; otherwise the first candidate
/// in response order is used. `Ok(None)` means the search came back empty.
pub fn resolve_team(source: &impl JsonSource, name: &str) -> Result<Option<u64>, ApiError> {
    let body = source.get_json("/teams", &[("search", name.to_string())])?;
    Ok(pick_team_id(&body, name))
}

pub fn pick_team_id(body: &Value, name: &str) -> Option<u64> {
    let candidates = body.get("response").and_then(|r| r.as_array())?;
    let first = candidates.first()?;
    let wanted = name.to_lowercase();

    let exact = candidates.iter().find(|item| {
        item.get("team")
            .and_then(|t| t.get("name"))
            .and_then(|n| n.as_str())
            .is_some_and(|n| n.to_lowercase() == wanted)
    });
    team_id(exact.unwrap_or(first))
}

fn team_id(item: &Value) -> Option<u64> {
    item.get("team")?.get("id")?.as_u64()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn exact_match_beats_first_result() {
        let body = json!({"response": [
            {"team": {"id": 1, "name": "Arsenal FC"}},
            {"team": {"id": 42, "name": "Arsenal"}},
        ]});
        assert_eq!(pick_team_id(&body, "Arsenal"), Some(42));
        assert_eq!(pick_team_id(&body, "arsenal"), Some(42));
    }

    #[test]
    fn falls_back_to_first_candidate() {
        let body = json!({"response": [
            {"team": {"id": 7, "name": "Real Madrid"}},
            {"team": {"id": 8, "name": "Real Madrid W"}},
        ]});
        assert_eq!(pick_team_id(&body, "Madrid"), Some(7));
    }

    #[test]
    fn empty_or_missing_response_is_not_found() {
        assert_eq!(pick_team_id(&json!({"response": []}), "Arsenal"), None);
        assert_eq!(pick_team_id(&json!({}), "Arsenal"), None);
    }
}
