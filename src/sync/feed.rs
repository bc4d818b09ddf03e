//! Independently refreshed "upcoming predictions" feed.
//!
//! The feed is a read-only mirror of server state. A refresh replaces the
//! whole list atomically; a failed refresh leaves the previous list
//! untouched (stale-but-consistent beats empty).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::PredictionApi;
use crate::error::SyncError;
use crate::models::UpcomingPrediction;

/// Shared handle over the feed state.
#[derive(Clone)]
pub struct UpcomingFeed {
    api: Arc<dyn PredictionApi>,
    inner: Arc<RwLock<FeedInner>>,
}

struct FeedInner {
    /// Server-ranked order, replaced wholesale on every refresh
    entries: Vec<UpcomingPrediction>,
    last_refreshed_at: Option<DateTime<Utc>>,
}

impl UpcomingFeed {
    pub fn new(api: Arc<dyn PredictionApi>) -> Self {
        UpcomingFeed {
            api,
            inner: Arc::new(RwLock::new(FeedInner {
                entries: Vec::new(),
                last_refreshed_at: None,
            })),
        }
    }

    /// Fetch the current feed and replace the stored list. Never merges.
    pub async fn refresh(&self) -> Result<(), SyncError> {
        match self.api.fetch_upcoming().await {
            Ok(entries) => {
                debug!("Upcoming feed refreshed: {} entr(ies)", entries.len());
                let mut inner = self.inner.write().await;
                inner.entries = entries;
                inner.last_refreshed_at = Some(Utc::now());
                Ok(())
            }
            Err(e) => {
                warn!("Upcoming feed refresh failed, keeping previous entries: {:#}", e);
                Err(SyncError::FeedRefreshFailed)
            }
        }
    }

    pub async fn entries(&self) -> Vec<UpcomingPrediction> {
        self.inner.read().await.entries.clone()
    }

    /// Informational only; `None` until the first successful refresh.
    pub async fn last_refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().await.last_refreshed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use chrono::NaiveDate;

    fn entry(home: &str, away: &str, winner: &str, confidence: u8) -> UpcomingPrediction {
        UpcomingPrediction {
            game_date: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
            home_team: home.to_string(),
            away_team: away.to_string(),
            predicted_winner: winner.to_string(),
            confidence,
            pred_home_score: 110,
            pred_away_score: 104,
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_not_merges() {
        let api = MockApi::new();
        api.script_upcoming(vec![
            entry("Bucks", "Cavaliers", "Bucks", 64),
            entry("Suns", "Nuggets", "Nuggets", 71),
        ]);
        api.script_upcoming(vec![entry("Mavericks", "Grizzlies", "Mavericks", 58)]);

        let feed = UpcomingFeed::new(api.clone());
        assert!(feed.entries().await.is_empty());
        assert!(feed.last_refreshed_at().await.is_none());

        feed.refresh().await.unwrap();
        assert_eq!(feed.entries().await.len(), 2);

        feed.refresh().await.unwrap();
        let entries = feed.entries().await;
        assert_eq!(entries.len(), 1, "old entries must not survive a refresh");
        assert_eq!(entries[0].home_team, "Mavericks");
        assert_eq!(api.upcoming_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_entries() {
        let api = MockApi::new();
        api.script_upcoming(vec![entry("Bucks", "Cavaliers", "Bucks", 64)]);
        api.script_upcoming_error("gateway timeout");

        let feed = UpcomingFeed::new(api.clone());
        feed.refresh().await.unwrap();
        let stamped = feed.last_refreshed_at().await;

        let err = feed.refresh().await.unwrap_err();
        assert_eq!(err, SyncError::FeedRefreshFailed);
        assert_eq!(feed.entries().await.len(), 1, "stale beats empty");
        assert_eq!(feed.last_refreshed_at().await, stamped);
    }
}
