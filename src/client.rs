use async_trait::async_trait;
use tracing::instrument;

use crate::error::Result;
use crate::model::{MatchDetail, MatchList};
use crate::source;
use crate::tracker::MatchSource;

/// The main entry point for fetching normalized cricket data.
///
/// `CricketClient` wraps a [`reqwest::Client`] and exposes methods to fetch
/// the ranked match list (from the live-scores page or the matches API) and
/// full details for a single match.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> cricket_tracker::Result<()> {
/// use cricket_tracker::CricketClient;
///
/// let client = CricketClient::new();
/// let matches = client.live_matches().await?;
/// println!("Found {} matches", matches.len());
/// # Ok(())
/// # }
/// ```
pub struct CricketClient {
    http: reqwest::Client,
    api_key: Option<String>,
}

impl CricketClient {
    /// Create a new client with default settings.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: None,
        }
    }

    /// Create a new client using the provided [`reqwest::Client`].
    ///
    /// Use this when you need to configure timeouts, proxies, headers, etc.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            http: client,
            api_key: None,
        }
    }

    /// Attach the API key sent with matches-API and match-center requests.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Fetch the ranked match list from the live-scores page.
    #[instrument(skip(self))]
    pub async fn live_matches(&self) -> Result<MatchList> {
        source::matchlist::get_live_matches(&self.http).await
    }

    /// Fetch the ranked match list from the recent-matches API endpoint.
    #[instrument(skip(self))]
    pub async fn recent_matches(&self) -> Result<MatchList> {
        source::matchlist::get_recent_matches(&self.http, self.api_key.as_deref()).await
    }

    /// Fetch full details for a specific match by upstream id.
    ///
    /// `Ok(None)` means the upstream had no usable data for the match right
    /// now, not that the match does not exist.
    #[instrument(skip(self))]
    pub async fn get_match(&self, match_id: u32) -> Result<Option<MatchDetail>> {
        source::match_detail::get_match(&self.http, self.api_key.as_deref(), match_id).await
    }
}

impl Default for CricketClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchSource for CricketClient {
    async fn fetch_matches(&self) -> Result<MatchList> {
        self.live_matches().await
    }
}
