use itertools::Itertools;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{Batsman, Innings, MatchDetail, Team, TeamRef};
use crate::source::{
    self, bool_field, first_present, short_team_name, str_field, u32_field, API_HOST,
};

const MATCH_CENTER_URL: &str = "https://cricbuzz-cricket.p.rapidapi.com/mcenter/v1";

/// Container keys for match-header information, in precedence order.
/// Endpoints and schema generations disagree on which one they send.
const HEADER_KEYS: [&str; 4] = ["matchHeader", "matchheaders", "matchInfo", "match"];

/// Container keys for score information, in precedence order.
const SCORE_KEYS: [&str; 3] = ["miniscore", "miniScore", "score"];

/// Status fragments that mean the match has finished. The derived flag
/// overrides any upstream `state`/`isLive` field, which have been seen
/// stale across endpoints.
const COMPLETE_MARKERS: [&str; 6] = ["won", "lost", "tied", "draw", "no result", "abandoned"];

/// Fetch and normalize full details for a single match.
///
/// Returns `Ok(None)` when the endpoint answers with an empty or unusable
/// body; callers should treat that as "temporarily unavailable".
#[instrument(skip(client, api_key))]
pub(crate) async fn get_match(
    client: &reqwest::Client,
    api_key: Option<&str>,
    match_id: u32,
) -> Result<Option<MatchDetail>> {
    let url = format!("{MATCH_CENTER_URL}/{match_id}/comm");
    let mut request = client
        .get(&url)
        .header("X-RapidAPI-Host", API_HOST);
    if let Some(key) = api_key {
        request = request.header("X-RapidAPI-Key", key);
    }
    let body = source::get_body(request, &url).await?;
    let payload: Value = serde_json::from_str(&body)?;
    let detail = parse_match_detail(&payload, match_id);
    debug!(match_id, found = detail.is_some(), "parsed match detail");
    Ok(detail)
}

/// Normalize a raw single-match payload into a canonical detail record.
///
/// Probes each known header and score container in precedence order and
/// defaults every optional sub-field individually. A payload carrying
/// neither container yields `None` rather than an error.
pub fn parse_match_detail(payload: &Value, match_id: u32) -> Option<MatchDetail> {
    if !payload.is_object() {
        return None;
    }
    let header = first_present(payload, &HEADER_KEYS);
    let score = first_present(payload, &SCORE_KEYS);
    if header.is_none() && score.is_none() {
        return None;
    }
    let null = Value::Null;
    let header = header.unwrap_or(&null);
    let score = score.unwrap_or(&null);

    let mut team1 = parse_team(header.get("team1"), 1);
    let mut team2 = parse_team(header.get("team2"), 2);

    let innings = parse_innings_list(payload, header, score);
    let status = str_field(header, &["status", "statusText"]).unwrap_or_default();
    let is_complete = status_is_complete(&status);
    let is_live = !is_complete && !innings.is_empty();

    let current_batting = first_present(score, &["batTeam", "batteam"]).and_then(parse_team_ref);
    // Upstream does not reliably supply the bowling side; it is always
    // whichever of the two teams is not batting.
    let current_bowling = current_batting.as_ref().map(|batting| {
        if batting.is_team(&team1) {
            TeamRef {
                id: team2.id,
                name: team2.name.clone(),
            }
        } else {
            TeamRef {
                id: team1.id,
                name: team1.name.clone(),
            }
        }
    });
    if let Some(batting) = &current_batting {
        team1.is_batting = batting.is_team(&team1);
        team2.is_batting = batting.is_team(&team2);
    }

    let title = str_field(header, &["matchDescription", "matchDesc", "title"])
        .unwrap_or_else(|| format!("{} vs {}", team1.name, team2.name));

    Some(MatchDetail {
        match_id,
        title,
        series: first_present(header, &["seriesDesc", "series"])
            .and_then(|s| str_field(s, &["name"]))
            .or_else(|| str_field(header, &["seriesName", "seriesname"]))
            .unwrap_or_default(),
        format: str_field(header, &["matchFormat", "matchformat", "format"]).unwrap_or_default(),
        status,
        teams: vec![team1, team2],
        innings,
        current_batting,
        current_bowling,
        batsmen: parse_batsmen(score),
        current_overs: str_field(score, &["overs", "currentOvers"]).unwrap_or_default(),
        is_live,
        is_complete,
    })
}

fn parse_team(raw: Option<&Value>, position: usize) -> Team {
    let name = raw
        .and_then(|t| str_field(t, &["name", "teamName", "teamname", "longName", "teamSName"]))
        .unwrap_or_else(|| format!("Team {position}"));
    Team {
        id: raw.and_then(|t| u32_field(t, &["id", "teamId", "teamid"])),
        short_name: short_team_name(&name),
        name,
        score: String::new(),
        score_info: String::new(),
        is_batting: false,
    }
}

fn parse_team_ref(raw: &Value) -> Option<TeamRef> {
    let id = u32_field(raw, &["batTeamId", "batteamid", "teamId", "id"]);
    let name = str_field(raw, &["batTeamName", "batteamname", "teamName", "name"]);
    if id.is_none() && name.is_none() {
        return None;
    }
    Some(TeamRef {
        id,
        name: name.unwrap_or_default(),
    })
}

/// Innings containers tried in order: the dedicated innings-score list on
/// the score container, the nested `matchScoreDetails` list, and finally a
/// flat `innings` field (single object or array). First non-empty wins.
fn parse_innings_list(payload: &Value, header: &Value, score: &Value) -> Vec<Innings> {
    let direct = first_present(score, &["inningsScoreList", "inningsscorelist"]);
    let nested = score
        .get("matchScoreDetails")
        .and_then(|d| first_present(d, &["inningsScoreList", "inningsscorelist"]));
    let flat = first_present(payload, &["innings"]).or_else(|| first_present(header, &["innings"]));

    for candidate in [direct, nested, flat].into_iter().flatten() {
        let records: Vec<&Value> = match candidate {
            Value::Array(items) => items.iter().collect(),
            Value::Object(_) => vec![candidate],
            _ => vec![],
        };
        let mut innings = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                let number = u32_field(record, &["inningsId", "inningsid"])
                    .unwrap_or(index as u32 + 1);
                (number, parse_innings(record))
            })
            .collect_vec();
        if !innings.is_empty() {
            // Batting order, regardless of upstream array order. Stable, so
            // records without an innings number keep their relative order.
            innings.sort_by_key(|(number, _)| *number);
            return innings.into_iter().map(|(_, innings)| innings).collect();
        }
    }
    vec![]
}

fn parse_innings(record: &Value) -> Innings {
    Innings {
        team_id: u32_field(record, &["batTeamId", "batteamid", "teamId"]),
        team_name: str_field(record, &["batTeamName", "batteamname", "teamName"])
            .unwrap_or_default(),
        runs: u32_field(record, &["score", "runs"]).unwrap_or(0),
        wickets: u32_field(record, &["wickets", "wkts"]).unwrap_or(0),
        overs: str_field(record, &["overs"]).unwrap_or_else(|| "0.0".to_string()),
        declared: bool_field(record, &["isDeclared", "isdeclared"]).unwrap_or(false),
    }
}

fn parse_batsmen(score: &Value) -> Vec<Batsman> {
    let striker = first_present(score, &["batsmanStriker", "striker"])
        .and_then(|b| parse_batsman(b, true));
    let non_striker = first_present(score, &["batsmanNonStriker", "nonStriker"])
        .and_then(|b| parse_batsman(b, false));
    [striker, non_striker].into_iter().flatten().collect()
}

fn parse_batsman(raw: &Value, on_strike: bool) -> Option<Batsman> {
    let name = str_field(raw, &["batName", "name"])?;
    Some(Batsman {
        name,
        runs: u32_field(raw, &["batRuns", "runs"]).unwrap_or(0),
        balls: u32_field(raw, &["batBalls", "balls"]).unwrap_or(0),
        on_strike,
    })
}

fn status_is_complete(status: &str) -> bool {
    let status = status.to_lowercase();
    COMPLETE_MARKERS.iter().any(|marker| status.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn commentary_payload() -> Value {
        json!({
            "matchHeader": {
                "matchDescription": "3rd ODI",
                "matchFormat": "ODI",
                "seriesDesc": { "name": "India tour of New Zealand" },
                "status": "India need 54 runs in 60 balls",
                "team1": { "id": 2, "name": "India" },
                "team2": { "id": 13, "name": "New Zealand" }
            },
            "miniscore": {
                "overs": "40.0",
                "batTeam": { "batTeamId": 2, "batTeamName": "India" },
                "batsmanStriker": { "batName": "Kohli", "batRuns": 84, "batBalls": 71 },
                "batsmanNonStriker": { "batName": "Iyer", "batRuns": 23, "batBalls": 30 },
                "matchScoreDetails": {
                    "inningsScoreList": [
                        { "inningsId": 2, "batTeamId": 2, "batTeamName": "India",
                          "score": 218, "wickets": 3, "overs": "40.0" },
                        { "inningsId": 1, "batTeamId": 13, "batTeamName": "New Zealand",
                          "score": 271, "wickets": 7, "overs": "50.0", "isDeclared": false }
                    ]
                }
            }
        })
    }

    #[test]
    fn commentary_shape_is_fully_normalized() {
        let detail = parse_match_detail(&commentary_payload(), 41881).unwrap();

        assert_eq!(detail.match_id, 41881);
        assert_eq!(detail.title, "3rd ODI");
        assert_eq!(detail.series, "India tour of New Zealand");
        assert_eq!(detail.teams[0].short_name, "IND");
        assert_eq!(detail.teams[1].short_name, "NZ");
        assert!(detail.is_live);
        assert!(!detail.is_complete);

        // Batting order, not upstream array order.
        assert_eq!(detail.innings[0].team_name, "New Zealand");
        assert_eq!(detail.innings[0].runs, 271);
        assert_eq!(detail.innings[1].team_name, "India");
        assert_eq!(detail.innings[1].wickets, 3);

        assert_eq!(detail.current_batting.as_ref().unwrap().id, Some(2));
        assert_eq!(detail.current_bowling.as_ref().unwrap().name, "New Zealand");
        assert!(detail.teams[0].is_batting);
        assert!(!detail.teams[1].is_batting);

        assert_eq!(detail.batsmen.len(), 2);
        assert!(detail.batsmen[0].on_strike);
        assert_eq!(detail.batsmen[0].name, "Kohli");
        assert!(!detail.batsmen[1].on_strike);
        assert_eq!(detail.current_overs, "40.0");
    }

    #[test]
    fn legacy_lowercase_shape_is_accepted() {
        let payload = json!({
            "matchheaders": {
                "status": "Pakistan won by 6 wickets",
                "team1": { "teamid": 3, "teamname": "Pakistan" },
                "team2": { "teamid": 5, "teamname": "Zimbabwe" }
            },
            "score": {
                "inningsscorelist": [
                    { "batteamid": 5, "batteamname": "Zimbabwe", "runs": 145, "wkts": 9 },
                    { "batteamid": 3, "batteamname": "Pakistan", "runs": 146, "wkts": 4 }
                ]
            }
        });

        let detail = parse_match_detail(&payload, 7).unwrap();
        assert_eq!(detail.teams[0].name, "Pakistan");
        assert_eq!(detail.teams[0].id, Some(3));
        assert!(detail.is_complete);
        assert!(!detail.is_live);
        assert_eq!(detail.innings.len(), 2);
        assert_eq!(detail.innings[0].runs, 145);
        assert_eq!(detail.innings[0].overs, "0.0");
    }

    #[test]
    fn flat_innings_field_accepts_single_object() {
        let payload = json!({
            "match": {
                "status": "",
                "team1": { "id": 1, "name": "Kenya" },
                "team2": { "id": 2, "name": "Namibia" },
                "innings": { "teamId": 1, "teamName": "Kenya", "runs": 88, "wickets": 2 }
            }
        });
        let detail = parse_match_detail(&payload, 1).unwrap();
        assert_eq!(detail.innings.len(), 1);
        assert_eq!(detail.innings[0].runs, 88);
        assert!(detail.is_live);
    }

    #[test]
    fn empty_payload_yields_none() {
        assert!(parse_match_detail(&json!(null), 1).is_none());
        assert!(parse_match_detail(&json!({}), 1).is_none());
        assert!(parse_match_detail(&json!({ "unrelated": true }), 1).is_none());
        assert!(parse_match_detail(&json!([1, 2]), 1).is_none());
    }

    #[test]
    fn missing_optionals_default_without_raising() {
        let payload = json!({ "matchHeader": {} });
        let detail = parse_match_detail(&payload, 9).unwrap();

        assert_eq!(detail.teams[0].name, "Team 1");
        assert_eq!(detail.teams[1].name, "Team 2");
        assert_eq!(detail.title, "Team 1 vs Team 2");
        assert!(detail.innings.is_empty());
        assert!(detail.batsmen.is_empty());
        assert!(detail.current_batting.is_none());
        assert!(detail.current_bowling.is_none());
        assert!(!detail.is_live);
        assert!(!detail.is_complete);
    }

    #[test]
    fn live_and_complete_are_mutually_exclusive() {
        let statuses = [
            "England won by an innings and 14 runs",
            "Match tied",
            "No result due to rain",
            "Match drawn",
            "Match abandoned without a ball bowled",
            "Day 3: session in progress",
            "",
        ];
        for status in statuses {
            let mut payload = commentary_payload();
            payload["matchHeader"]["status"] = json!(status);
            let detail = parse_match_detail(&payload, 1).unwrap();
            assert!(
                !(detail.is_live && detail.is_complete),
                "both flags set for status {status:?}"
            );
        }
    }

    #[test]
    fn derived_state_overrides_upstream_flags() {
        let mut payload = commentary_payload();
        payload["matchHeader"]["status"] = json!("Australia won by 7 wickets");
        payload["matchHeader"]["state"] = json!("inprogress");
        payload["matchHeader"]["isLive"] = json!(true);

        let detail = parse_match_detail(&payload, 1).unwrap();
        assert!(detail.is_complete);
        assert!(!detail.is_live);
    }
}
