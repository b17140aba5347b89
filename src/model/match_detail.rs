use serde::Serialize;

use super::innings::{Batsman, Innings};
use super::team::{Team, TeamRef};

/// Full details of a single tracked match.
///
/// Rebuilt from scratch on every refresh; nothing here is mutated
/// incrementally. `is_live` and `is_complete` are derived from the status
/// text and are never both true.
#[derive(Debug, Clone, Serialize)]
pub struct MatchDetail {
    pub match_id: u32,
    pub title: String,
    pub series: String,
    pub format: String,
    pub status: String,
    pub teams: Vec<Team>,
    /// Innings in batting order (first innings first).
    pub innings: Vec<Innings>,
    pub current_batting: Option<TeamRef>,
    /// Always derived as the non-batting side; upstream does not reliably
    /// supply it.
    pub current_bowling: Option<TeamRef>,
    /// Current partnership, 0-2 entries.
    pub batsmen: Vec<Batsman>,
    /// Overs bowled in the innings in progress, e.g. "12.4".
    pub current_overs: String,
    pub is_live: bool,
    pub is_complete: bool,
}
