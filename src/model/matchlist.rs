use chrono::{DateTime, Utc};
use serde::Serialize;

use super::team::Team;

/// A ranked list of match summaries from one fetch.
pub type MatchList = Vec<MatchSummary>;

/// Coarse lifecycle phase of a match, derived from the upstream state field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum MatchPhase {
    NotStarted,
    Live,
    Completed,
}

/// Summary information for a single match within a fetched list.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSummary {
    /// 1-based position in ranked order, assigned after sorting.
    pub position: u32,
    /// Upstream match identifier, stable across fetches.
    pub match_id: u32,
    pub title: String,
    pub series: String,
    pub ground: String,
    /// Match format, e.g. "TEST", "ODI", "T20".
    pub format: String,
    pub teams: Vec<Team>,
    pub status: String,
    pub phase: MatchPhase,
    pub start_time: Option<DateTime<Utc>>,
    /// Live overs text while in play, empty otherwise.
    pub live_overs: String,
    /// Derived ranking score; higher sorts first. Recomputed every fetch.
    pub priority: i32,
}

impl MatchSummary {
    pub fn is_live(&self) -> bool {
        self.phase == MatchPhase::Live
    }
}
