pub(crate) mod match_detail;
pub(crate) mod matchlist;

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::debug;

use crate::error::{CricketError, Result};

/// Browser-like UA; the live-scores page serves a stripped document to
/// unknown clients.
pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// RapidAPI host header value for the matches API and match center.
pub(crate) const API_HOST: &str = "cricbuzz-cricket.p.rapidapi.com";

/// Send a prepared request and return the response body as text.
pub(crate) async fn get_body(request: reqwest::RequestBuilder, url: &str) -> Result<String> {
    debug!(url, "fetching");

    let response = request.send().await.map_err(|e| CricketError::Http {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(CricketError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        });
    }

    response.text().await.map_err(|e| CricketError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })
}

/// Extract the one embedded JSON blob from a fetched HTML page.
///
/// The live-scores page ships its data inside `script#__NEXT_DATA__`.
pub fn extract_embedded_json(body: &str) -> Result<Value> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("script#__NEXT_DATA__")
        .map_err(|_| CricketError::EmbeddedJsonNotFound {
            context: "script#__NEXT_DATA__ selector",
        })?;
    let script = document
        .select(&selector)
        .next()
        .ok_or(CricketError::EmbeddedJsonNotFound {
            context: "script#__NEXT_DATA__ element",
        })?;
    let raw: String = script.text().collect();
    Ok(serde_json::from_str(&raw)?)
}

/// Return the first of `keys` present (and non-null) on `value`.
///
/// Upstream key casing has drifted over time, so every probe site lists its
/// historical candidates in precedence order.
pub(crate) fn first_present<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| value.get(*k))
        .find(|v| !v.is_null())
}

/// Probe `keys` in order for a string-ish field. Numbers are rendered to
/// their decimal form since upstream flips between the two.
pub(crate) fn str_field(value: &Value, keys: &[&str]) -> Option<String> {
    first_present(value, keys).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Probe `keys` in order for an unsigned integer, accepting numeric strings.
pub(crate) fn u32_field(value: &Value, keys: &[&str]) -> Option<u32> {
    first_present(value, keys).and_then(|v| match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Probe `keys` in order for a boolean, accepting "true"/"false" strings.
pub(crate) fn bool_field(value: &Value, keys: &[&str]) -> Option<bool> {
    first_present(value, keys).and_then(|v| match v {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Known abbreviations for the international sides.
const TEAM_ABBREVIATIONS: [(&str, &str); 11] = [
    ("India", "IND"),
    ("Australia", "AUS"),
    ("England", "ENG"),
    ("Pakistan", "PAK"),
    ("South Africa", "SA"),
    ("New Zealand", "NZ"),
    ("West Indies", "WI"),
    ("Sri Lanka", "SL"),
    ("Bangladesh", "BAN"),
    ("Zimbabwe", "ZIM"),
    ("Afghanistan", "AFG"),
];

/// Derive a short display name for a team.
///
/// Exact table match first, then substring containment against table keys
/// (catches "India Women", "England XI"), else the uppercased initials of
/// the name truncated to 3 characters.
pub(crate) fn short_team_name(name: &str) -> String {
    if let Some((_, abbr)) = TEAM_ABBREVIATIONS.iter().find(|(full, _)| *full == name) {
        return (*abbr).to_string();
    }
    if let Some((_, abbr)) = TEAM_ABBREVIATIONS
        .iter()
        .find(|(full, _)| name.contains(full))
    {
        return (*abbr).to_string();
    }
    let initials: String = name
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .collect();
    initials.to_uppercase().chars().take(3).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn short_name_prefers_table_entries() {
        assert_eq!(short_team_name("India"), "IND");
        assert_eq!(short_team_name("New Zealand"), "NZ");
        assert_eq!(short_team_name("India Women"), "IND");
    }

    #[test]
    fn short_name_falls_back_to_initials() {
        assert_eq!(short_team_name("Chennai Super Kings"), "CSK");
        assert_eq!(short_team_name("Royal Challengers Bangalore"), "RCB");
        assert_eq!(short_team_name("United Arab Emirates Cricket Board XI"), "UAE");
    }

    #[test]
    fn field_probes_follow_precedence_and_skip_null() {
        let v = json!({"teamId": null, "teamid": 7, "name": 42});
        assert_eq!(u32_field(&v, &["teamId", "teamid"]), Some(7));
        assert_eq!(str_field(&v, &["name"]).as_deref(), Some("42"));
        assert_eq!(str_field(&v, &["missing"]), None);
    }

    #[test]
    fn embedded_json_is_extracted_from_page() {
        let body = r#"<html><head></head><body>
            <script id="__NEXT_DATA__" type="application/json">{"props":{"x":1}}</script>
        </body></html>"#;
        let value = extract_embedded_json(body).unwrap();
        assert_eq!(value["props"]["x"], 1);
    }

    #[test]
    fn missing_script_tag_is_an_error() {
        let err = extract_embedded_json("<html><body></body></html>").unwrap_err();
        assert!(matches!(
            err,
            crate::error::CricketError::EmbeddedJsonNotFound { .. }
        ));
    }
}
