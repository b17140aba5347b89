use serde::Serialize;

/// One team's batting turn within a match.
#[derive(Debug, Clone, Serialize)]
pub struct Innings {
    pub team_id: Option<u32>,
    pub team_name: String,
    pub runs: u32,
    pub wickets: u32,
    /// Overs bowled as upstream renders it, e.g. "45.3".
    pub overs: String,
    pub declared: bool,
}

/// One of the (at most two) batsmen in the current partnership.
///
/// The pair is replaced wholesale on every refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Batsman {
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub on_strike: bool,
}
