//! Live cricket score tracking.
//!
//! Normalizes the inconsistent upstream score feeds into one canonical
//! model and keeps a single selected match refreshed on a timer, fanning
//! state transitions out to subscribers.

pub use client::CricketClient;
pub use error::{CricketError, Result};
pub use source::extract_embedded_json;
pub use source::match_detail::parse_match_detail;
pub use source::matchlist::parse_matchlist;
pub use tracker::{
    MatchSource, MatchTracker, TrackerEvent, TrackerState, DEFAULT_REFRESH_SECS, MIN_REFRESH_SECS,
};

pub mod client;
pub mod error;
pub mod model;
pub(crate) mod source;
pub mod tracker;
