use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{CricketError, Result};
use crate::model::{MatchList, MatchPhase, MatchSummary, Team};
use crate::source::{
    self, bool_field, first_present, short_team_name, str_field, u32_field, API_HOST,
};

const LIVE_SCORES_URL: &str = "https://www.espncricinfo.com/live-cricket-score";
const RECENT_MATCHES_URL: &str = "https://cricbuzz-cricket.p.rapidapi.com/matches/v1/recent";

/// Nation names that bump a match's ranking when they appear in a team name.
const POPULAR_TEAMS: [&str; 10] = [
    "India",
    "Pakistan",
    "Australia",
    "England",
    "South Africa",
    "New Zealand",
    "Sri Lanka",
    "West Indies",
    "Bangladesh",
    "Afghanistan",
];

/// Fetch the live-scores page and normalize its embedded match list.
#[instrument(skip(client))]
pub(crate) async fn get_live_matches(client: &reqwest::Client) -> Result<MatchList> {
    let request = client
        .get(LIVE_SCORES_URL)
        .header(reqwest::header::USER_AGENT, source::USER_AGENT);
    let body = source::get_body(request, LIVE_SCORES_URL).await?;
    let payload = source::extract_embedded_json(&body)?;
    let matches = parse_matchlist(&payload)?;
    debug!(count = matches.len(), "parsed live match list");
    Ok(matches)
}

/// Fetch the recent-matches API endpoint and normalize its aggregate list.
#[instrument(skip(client, api_key))]
pub(crate) async fn get_recent_matches(
    client: &reqwest::Client,
    api_key: Option<&str>,
) -> Result<MatchList> {
    let mut request = client
        .get(RECENT_MATCHES_URL)
        .header("X-RapidAPI-Host", API_HOST);
    if let Some(key) = api_key {
        request = request.header("X-RapidAPI-Key", key);
    }
    let body = source::get_body(request, RECENT_MATCHES_URL).await?;
    let payload: Value = serde_json::from_str(&body)?;
    let matches = parse_matchlist(&payload)?;
    debug!(count = matches.len(), "parsed recent match list");
    Ok(matches)
}

/// Normalize a raw match-list payload into ranked summaries.
///
/// Accepts both known upstream layouts without the caller pre-classifying:
/// the aggregate `typeMatches` nesting and the flat page array. Entries
/// missing required fields are skipped; an unrecognizable root fails.
pub fn parse_matchlist(payload: &Value) -> Result<MatchList> {
    let entries = collect_entries(payload)?;
    let mut matches: Vec<MatchSummary> = entries.into_iter().filter_map(parse_entry).collect();
    matches.sort_by_key(|m| std::cmp::Reverse(m.priority));
    for (index, summary) in matches.iter_mut().enumerate() {
        summary.position = index as u32 + 1;
    }
    Ok(matches)
}

/// Known depths at which the page layout buries its flat `matches` array.
const FLAT_MATCH_PATHS: [&[&str]; 4] = [
    &["matches"],
    &["content", "matches"],
    &["data", "content", "matches"],
    &["props", "appPageProps", "data", "content", "matches"],
];

fn collect_entries(payload: &Value) -> Result<Vec<&Value>> {
    if let Value::Array(entries) = payload {
        return Ok(entries.iter().collect());
    }
    if !payload.is_object() {
        return Err(CricketError::UnrecognizedPayload {
            context: "match list root is neither object nor array",
        });
    }

    if let Some(groups) = payload.get("typeMatches") {
        // Aggregate layout. A missing level anywhere contributes nothing
        // rather than failing the whole list.
        let mut entries = vec![];
        for group in groups.as_array().into_iter().flatten() {
            for series in group
                .get("seriesMatches")
                .and_then(Value::as_array)
                .into_iter()
                .flatten()
            {
                let wrapper = series.get("seriesAdWrapper").unwrap_or(series);
                for entry in wrapper
                    .get("matches")
                    .and_then(Value::as_array)
                    .into_iter()
                    .flatten()
                {
                    entries.push(entry);
                }
            }
        }
        return Ok(entries);
    }

    for path in FLAT_MATCH_PATHS {
        let found = path.iter().try_fold(payload, |v, key| v.get(*key));
        if let Some(entries) = found.and_then(Value::as_array) {
            return Ok(entries.iter().collect());
        }
    }

    Err(CricketError::UnrecognizedPayload {
        context: "match list container not found",
    })
}

fn parse_entry(entry: &Value) -> Option<MatchSummary> {
    // Aggregate entries wrap everything in `matchInfo`; page entries are flat.
    let info = entry.get("matchInfo").unwrap_or(entry);

    let match_id = u32_field(info, &["objectId", "matchId", "matchid"]);
    let title = str_field(info, &["title", "matchDesc", "matchdesc"]);
    let series = first_present(info, &["series"])
        .and_then(|s| str_field(s, &["name", "longName"]))
        .or_else(|| str_field(info, &["seriesName", "seriesname"]));
    let teams = parse_teams(info);

    let (match_id, title, series, teams) = match (match_id, title, series, teams) {
        (Some(id), Some(title), Some(series), Some(teams)) => (id, title, series, teams),
        _ => {
            debug!("skipping match entry with missing required fields");
            return None;
        }
    };

    let phase = parse_phase(str_field(info, &["state"]).as_deref());
    let ground = first_present(info, &["ground"])
        .and_then(|g| match g {
            Value::Object(_) => str_field(g, &["smallName", "name"]),
            Value::String(s) => Some(s.clone()),
            _ => None,
        })
        .or_else(|| str_field(info, &["venue"]))
        .unwrap_or_else(|| "TBD".to_string());
    let international = first_present(info, &["internationalClassId"]).is_some();
    let priority = match_priority(phase, &teams, international);

    Some(MatchSummary {
        position: 0, // assigned after sorting
        match_id,
        title,
        series,
        ground,
        format: str_field(info, &["format", "matchFormat", "matchformat"]).unwrap_or_default(),
        teams,
        status: str_field(info, &["statusText", "status"]).unwrap_or_default(),
        phase,
        start_time: first_present(info, &["startTime", "startDate", "startdate"])
            .and_then(parse_start_time),
        live_overs: str_field(info, &["liveOvers"]).unwrap_or_default(),
        priority,
    })
}

/// Teams come either as a `teams` wrapper array (page layout) or as
/// `team1`/`team2` objects (aggregate layout). Both sides must resolve a
/// name for the entry to count.
fn parse_teams(info: &Value) -> Option<Vec<Team>> {
    let teams: Vec<Team> = if let Some(wrappers) = info.get("teams").and_then(Value::as_array) {
        wrappers
            .iter()
            .filter_map(|wrapper| {
                let team = wrapper.get("team").unwrap_or(wrapper);
                let name = str_field(team, &["longName", "name", "teamName"])?;
                Some(Team {
                    id: u32_field(team, &["objectId", "id", "teamId"]),
                    short_name: short_team_name(&name),
                    name,
                    score: str_field(wrapper, &["score"]).unwrap_or_default(),
                    score_info: str_field(wrapper, &["scoreInfo"]).unwrap_or_default(),
                    is_batting: bool_field(wrapper, &["isLive"]).unwrap_or_default(),
                })
            })
            .collect()
    } else {
        ["team1", "team2"]
            .into_iter()
            .filter_map(|key| {
                let team = info.get(key)?;
                let name = str_field(team, &["teamName", "name", "longName", "teamSName"])?;
                Some(Team {
                    id: u32_field(team, &["teamId", "id", "teamid"]),
                    short_name: short_team_name(&name),
                    name,
                    score: String::new(),
                    score_info: String::new(),
                    is_batting: false,
                })
            })
            .collect()
    };
    (teams.len() >= 2).then_some(teams)
}

fn parse_phase(state: Option<&str>) -> MatchPhase {
    let state = state.unwrap_or_default().to_lowercase();
    if state == "live" || state.contains("progress") || state.contains("innings") {
        MatchPhase::Live
    } else if state == "post" || state.contains("complete") {
        MatchPhase::Completed
    } else {
        MatchPhase::NotStarted
    }
}

/// Ranking score for list order, recomputed from scratch every fetch.
fn match_priority(phase: MatchPhase, teams: &[Team], international: bool) -> i32 {
    let mut priority = 0;
    if phase == MatchPhase::Live {
        priority += 100;
    }
    for nation in POPULAR_TEAMS {
        if teams.iter().any(|t| t.name.contains(nation)) {
            priority += 50;
        }
    }
    if international {
        priority += 25;
    }
    if phase == MatchPhase::Completed {
        priority += 10;
    }
    priority
}

fn parse_start_time(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        Value::String(s) => {
            if let Ok(ms) = s.trim().parse::<i64>() {
                return Utc.timestamp_millis_opt(ms).single();
            }
            DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}
