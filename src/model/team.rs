use serde::Serialize;

/// A team as it appears in a match, summary or detail.
///
/// Upstream payloads are inconsistent about team identifiers, so `id` is
/// optional; two teams are considered the same side by id when both carry
/// one, by name otherwise.
#[derive(Debug, Clone, Serialize)]
pub struct Team {
    pub id: Option<u32>,
    pub name: String,
    /// Abbreviated display name ("IND", "NZ"), derived during normalization.
    pub short_name: String,
    /// Raw score string as upstream renders it, e.g. "287/6".
    pub score: String,
    /// Free-text score detail, e.g. "(45.3 ov)".
    pub score_info: String,
    /// Whether this side is currently batting.
    pub is_batting: bool,
}

/// A lightweight reference to one side of a match.
#[derive(Debug, Clone, Serialize)]
pub struct TeamRef {
    pub id: Option<u32>,
    pub name: String,
}

impl TeamRef {
    /// Whether this reference points at `team`, matching by id when both
    /// carry one and by name otherwise.
    pub fn is_team(&self, team: &Team) -> bool {
        match (self.id, team.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.name == team.name,
        }
    }
}
