//! Per-contest prediction cache with at-most-one-request-per-id semantics.
//!
//! The entry is flipped to `Pending` under the write lock *before* the
//! request is issued, so a duplicate call observes `Pending` and returns
//! without touching the network. `Resolved` is sticky for the lifetime of
//! the cache; `Failed` is not, so a user can retry a flaky request.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{error, info, warn};

use crate::api::PredictionApi;
use crate::error::SyncError;
use crate::models::{CoreEvent, PredictionEntry, PredictionRequest};

/// Shared handle over the prediction cache state.
#[derive(Clone)]
pub struct PredictionCache {
    api: Arc<dyn PredictionApi>,
    events: mpsc::Sender<CoreEvent>,
    inner: Arc<RwLock<HashMap<String, PredictionEntry>>>,
}

impl PredictionCache {
    pub fn new(api: Arc<dyn PredictionApi>, events: mpsc::Sender<CoreEvent>) -> Self {
        PredictionCache {
            api,
            events,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Request a prediction for the contest in `request`.
    ///
    /// No-op if one is already in flight or resolved for this id. Entries
    /// keyed by contest id outlive date navigation; a request whose view
    /// is gone simply completes into the cache.
    pub async fn request(&self, request: &PredictionRequest) -> Result<(), SyncError> {
        {
            let mut entries = self.inner.write().await;
            match entries.get(&request.contest_id) {
                Some(PredictionEntry::Pending) | Some(PredictionEntry::Resolved(_)) => {
                    return Ok(());
                }
                // Unseen or Failed: eligible for a (re)try
                _ => {}
            }
            entries.insert(request.contest_id.clone(), PredictionEntry::Pending);
        }

        match self.api.fetch_prediction(request).await {
            Ok(outcome) => {
                info!(
                    "Prediction resolved for contest {}: {} ({}%)",
                    request.contest_id, outcome.winner, outcome.confidence
                );
                self.inner
                    .write()
                    .await
                    .insert(request.contest_id.clone(), PredictionEntry::Resolved(outcome));

                // Fire-and-forget: a stuck consumer must not block or fail
                // the prediction that triggered the event.
                let event = CoreEvent::PredictionResolved(request.contest_id.clone());
                if let Err(e) = self.events.try_send(event) {
                    error!("Core event channel full, event dropped: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Prediction for contest {} failed: {:#}", request.contest_id, e);
                let reason = format!("{:#}", e);
                self.inner.write().await.insert(
                    request.contest_id.clone(),
                    PredictionEntry::Failed(reason.clone()),
                );
                Err(SyncError::PredictionFailed {
                    contest_id: request.contest_id.clone(),
                    reason,
                })
            }
        }
    }

    /// Current entry for a contest id; `Unrequested` if never seen.
    pub async fn get(&self, contest_id: &str) -> PredictionEntry {
        self.inner
            .read()
            .await
            .get(contest_id)
            .cloned()
            .unwrap_or(PredictionEntry::Unrequested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::models::PredictionOutcome;
    use chrono::NaiveDate;

    fn lakers_request() -> PredictionRequest {
        PredictionRequest {
            contest_id: "0012345".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            home_team: "Lakers".to_string(),
            away_team: "Celtics".to_string(),
        }
    }

    fn lakers_outcome() -> PredictionOutcome {
        PredictionOutcome {
            winner: "Lakers".to_string(),
            confidence: 72,
            explanation: "Home-court edge and healthier rotation.".to_string(),
            pred_home_score: 108,
            pred_away_score: 101,
        }
    }

    fn channel() -> (mpsc::Sender<CoreEvent>, mpsc::Receiver<CoreEvent>) {
        mpsc::channel(16)
    }

    #[tokio::test]
    async fn test_unseen_contest_reads_unrequested() {
        let (tx, _rx) = channel();
        let cache = PredictionCache::new(MockApi::new(), tx);
        assert_eq!(cache.get("0012345").await, PredictionEntry::Unrequested);
    }

    #[tokio::test]
    async fn test_duplicate_request_while_in_flight_is_a_no_op() {
        let api = MockApi::new();
        api.script_prediction(lakers_outcome());
        let gate = api.gate_predictions();
        let (tx, _rx) = channel();
        let cache = PredictionCache::new(api.clone(), tx);

        let first = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.request(&lakers_request()).await })
        };
        tokio::task::yield_now().await;
        assert_eq!(cache.get("0012345").await, PredictionEntry::Pending);

        // Second call observes Pending and never reaches the network
        cache.request(&lakers_request()).await.unwrap();
        assert_eq!(api.predict_calls(), 1);

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert_eq!(api.predict_calls(), 1);
        assert_eq!(
            cache.get("0012345").await,
            PredictionEntry::Resolved(lakers_outcome())
        );
    }

    #[tokio::test]
    async fn test_resolved_entry_is_sticky() {
        let api = MockApi::new();
        api.script_prediction(lakers_outcome());
        let (tx, _rx) = channel();
        let cache = PredictionCache::new(api.clone(), tx);

        cache.request(&lakers_request()).await.unwrap();
        let first_read = cache.get("0012345").await;

        // Re-requesting a resolved contest never re-fetches; an accidental
        // call would hit the empty script queue and fail loudly.
        cache.request(&lakers_request()).await.unwrap();
        assert_eq!(api.predict_calls(), 1);
        assert_eq!(cache.get("0012345").await, first_read);
    }

    #[tokio::test]
    async fn test_failed_entry_is_retriable() {
        let api = MockApi::new();
        api.script_prediction_error("model backend unreachable");
        api.script_prediction(lakers_outcome());
        let (tx, _rx) = channel();
        let cache = PredictionCache::new(api.clone(), tx);

        let err = cache.request(&lakers_request()).await.unwrap_err();
        match err {
            SyncError::PredictionFailed { contest_id, reason } => {
                assert_eq!(contest_id, "0012345");
                assert!(reason.contains("unreachable"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            cache.get("0012345").await,
            PredictionEntry::Failed(_)
        ));

        // Explicit retry is allowed to issue a fresh network call
        cache.request(&lakers_request()).await.unwrap();
        assert_eq!(api.predict_calls(), 2);
        assert_eq!(
            cache.get("0012345").await,
            PredictionEntry::Resolved(lakers_outcome())
        );
    }

    #[tokio::test]
    async fn test_resolution_emits_event_failure_does_not() {
        let api = MockApi::new();
        api.script_prediction_error("timeout");
        api.script_prediction(lakers_outcome());
        let (tx, mut rx) = channel();
        let cache = PredictionCache::new(api.clone(), tx);

        let _ = cache.request(&lakers_request()).await;
        assert!(rx.try_recv().is_err(), "failure must not trigger a refresh");

        cache.request(&lakers_request()).await.unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            CoreEvent::PredictionResolved("0012345".to_string())
        );
    }
}
