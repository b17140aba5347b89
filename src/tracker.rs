use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use crate::error::{CricketError, Result};
use crate::model::{MatchList, MatchSummary};

/// Floor below which [`MatchTracker::set_refresh_rate`] rejects the value.
pub const MIN_REFRESH_SECS: u64 = 5;

/// Base refresh interval; each tracker jitters it once at construction so
/// concurrent instances do not hit the upstream in lockstep.
pub const DEFAULT_REFRESH_SECS: u64 = 40;

const JITTER_SECS: std::ops::RangeInclusive<i64> = -10..=20;

/// Anything that can produce the current ranked match list.
///
/// [`CricketClient`](crate::CricketClient) is the real implementation;
/// tests substitute in-memory stubs.
#[async_trait]
pub trait MatchSource: Send + Sync {
    async fn fetch_matches(&self) -> Result<MatchList>;
}

/// Notifications delivered, in production order, to every subscriber.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// A fresh match list was fetched and ranked.
    MatchesUpdated(MatchList),
    /// A match was selected and its refresh cycle started.
    MatchSelected(MatchSummary),
    /// The selected match was re-resolved on a refresh tick.
    MatchUpdated(MatchSummary),
    /// A fetch/normalize failure, or the selected match vanishing from the
    /// feed. Never terminates the refresh cycle.
    Error(String),
}

/// Lifecycle state of a [`MatchTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TrackerState {
    /// Nothing fetched yet.
    Idle,
    /// A list snapshot exists, nothing selected.
    Listed,
    /// A match is selected and the refresh cycle is running.
    Tracking,
    /// The cycle was explicitly halted; selection is retained.
    Stopped,
}

struct Shared {
    matches: MatchList,
    selected_id: Option<u32>,
    state: TrackerState,
    interval: Duration,
    /// Bumped whenever the cycle is (re)started or stopped; a tick whose
    /// generation no longer matches discards its result.
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Owns the selected match and drives its recurring refresh cycle.
///
/// All state lives on the instance; independent trackers can coexist in one
/// process. Operations that start the cycle ([`select_match`],
/// [`change_match`], [`set_refresh_rate`]) must be called within a Tokio
/// runtime.
///
/// [`select_match`]: MatchTracker::select_match
/// [`change_match`]: MatchTracker::change_match
/// [`set_refresh_rate`]: MatchTracker::set_refresh_rate
pub struct MatchTracker {
    source: Arc<dyn MatchSource>,
    shared: Arc<Mutex<Shared>>,
    events: broadcast::Sender<TrackerEvent>,
}

impl MatchTracker {
    pub fn new(source: Arc<dyn MatchSource>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            source,
            shared: Arc::new(Mutex::new(Shared {
                matches: vec![],
                selected_id: None,
                state: TrackerState::Idle,
                interval: default_interval(),
                generation: 0,
                task: None,
            })),
            events,
        }
    }

    /// Register a subscriber. Events are fanned out in the order produced
    /// to every receiver alive at emission time.
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> TrackerState {
        self.shared.lock().unwrap().state
    }

    /// The most recent list snapshot, in ranked order.
    pub fn all_matches(&self) -> MatchList {
        self.shared.lock().unwrap().matches.clone()
    }

    /// The selected match as resolved against the current snapshot, if any.
    pub fn selected_match(&self) -> Option<MatchSummary> {
        let shared = self.shared.lock().unwrap();
        let id = shared.selected_id?;
        shared.matches.iter().find(|m| m.match_id == id).cloned()
    }

    /// Fetch the match list and store it as the current snapshot.
    ///
    /// Emits [`TrackerEvent::MatchesUpdated`] on success. On failure the
    /// prior snapshot and state are kept and an [`TrackerEvent::Error`] is
    /// emitted alongside the returned error.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<MatchList> {
        match self.source.fetch_matches().await {
            Ok(matches) => {
                {
                    let mut shared = self.shared.lock().unwrap();
                    shared.matches = matches.clone();
                    if shared.state == TrackerState::Idle {
                        shared.state = TrackerState::Listed;
                    }
                }
                debug!(count = matches.len(), "match list initialized");
                self.emit(TrackerEvent::MatchesUpdated(matches.clone()));
                Ok(matches)
            }
            Err(e) => {
                warn!(error = %e, "initialize failed");
                self.emit(TrackerEvent::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Select a match by upstream id and start (or restart) the refresh
    /// cycle for it.
    ///
    /// An id absent from the current snapshot returns
    /// [`CricketError::MatchNotFound`] and leaves selection, state, and any
    /// running cycle untouched.
    #[instrument(skip(self))]
    pub fn select_match(&self, match_id: u32) -> Result<MatchSummary> {
        let summary = {
            let shared = self.shared.lock().unwrap();
            shared
                .matches
                .iter()
                .find(|m| m.match_id == match_id)
                .cloned()
        }
        .ok_or(CricketError::MatchNotFound { match_id })?;

        self.start_cycle(Some(match_id));
        debug!(match_id, "match selected");
        self.emit(TrackerEvent::MatchSelected(summary.clone()));
        Ok(summary)
    }

    /// Switch tracking to a different match: stop-then-select, with no
    /// partial state when the new id is unknown.
    #[instrument(skip(self))]
    pub fn change_match(&self, match_id: u32) -> Result<MatchSummary> {
        // select_match already fully stops the previous cycle on success
        // and disturbs nothing on a miss.
        self.select_match(match_id)
    }

    /// Cancel the active refresh cycle, keeping the selection. Idempotent.
    pub fn stop_auto_refresh(&self) {
        let mut shared = self.shared.lock().unwrap();
        if let Some(task) = shared.task.take() {
            task.abort();
            shared.generation += 1;
            shared.state = TrackerState::Stopped;
            debug!("auto refresh stopped");
        }
    }

    /// Update the refresh interval. Values below [`MIN_REFRESH_SECS`] are
    /// rejected and the prior rate stays active. While tracking, the cycle
    /// restarts immediately so the next tick is a full new interval away.
    pub fn set_refresh_rate(&self, seconds: u64) -> Result<()> {
        if seconds < MIN_REFRESH_SECS {
            return Err(CricketError::InvalidRefreshRate {
                seconds,
                min: MIN_REFRESH_SECS,
            });
        }
        let restart = {
            let mut shared = self.shared.lock().unwrap();
            shared.interval = Duration::from_secs(seconds);
            shared.state == TrackerState::Tracking
        };
        if restart {
            self.start_cycle(None);
        }
        debug!(seconds, "refresh rate updated");
        Ok(())
    }

    fn emit(&self, event: TrackerEvent) {
        // send only fails when no subscriber is listening
        let _ = self.events.send(event);
    }

    /// Stop any running cycle and start a fresh one under the current
    /// interval, optionally re-pointing the selection first.
    fn start_cycle(&self, select: Option<u32>) {
        let mut shared = self.shared.lock().unwrap();
        if let Some(task) = shared.task.take() {
            task.abort();
        }
        if let Some(match_id) = select {
            shared.selected_id = Some(match_id);
        }
        shared.state = TrackerState::Tracking;
        shared.generation += 1;

        let generation = shared.generation;
        let interval = shared.interval;
        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.shared);
        let events = self.events.clone();
        shared.task = Some(tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                run_tick(&source, &state, &events, generation).await;
            }
        }));
    }
}

impl Drop for MatchTracker {
    fn drop(&mut self) {
        if let Ok(mut shared) = self.shared.lock() {
            if let Some(task) = shared.task.take() {
                task.abort();
            }
        }
    }
}

/// One refresh-cycle tick: re-fetch the list, swap the snapshot, re-resolve
/// the selection. Every failure becomes an [`TrackerEvent::Error`]; nothing
/// here ever terminates the cycle. A tick that raced a stop/restart
/// (generation mismatch) discards its result without emitting.
async fn run_tick(
    source: &Arc<dyn MatchSource>,
    shared: &Arc<Mutex<Shared>>,
    events: &broadcast::Sender<TrackerEvent>,
    generation: u64,
) {
    let result = source.fetch_matches().await;
    let event = {
        let mut guard = shared.lock().unwrap();
        if guard.generation != generation {
            debug!(generation, "discarding stale refresh result");
            return;
        }
        match result {
            Ok(matches) => {
                guard.matches = matches;
                let resolved = guard
                    .selected_id
                    .and_then(|id| guard.matches.iter().find(|m| m.match_id == id).cloned());
                match resolved {
                    Some(summary) => TrackerEvent::MatchUpdated(summary),
                    None => TrackerEvent::Error("selected match no longer available".to_string()),
                }
            }
            Err(e) => {
                warn!(error = %e, "refresh tick failed");
                TrackerEvent::Error(e.to_string())
            }
        }
    };
    let _ = events.send(event);
}

fn default_interval() -> Duration {
    let jitter = rand::thread_rng().gen_range(JITTER_SECS);
    Duration::from_secs((DEFAULT_REFRESH_SECS as i64 + jitter) as u64)
}
