use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::models::{ContestSummary, PredictionOutcome, PredictionRequest, UpcomingPrediction};

/// The HTTP collaborator the sync core talks to. One backend serves all
/// three shapes; the trait seam exists so the caches can be exercised
/// against scripted in-memory implementations.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Contests scheduled for one calendar day, in server order.
    async fn fetch_schedule(&self, date: NaiveDate) -> Result<Vec<ContestSummary>>;

    /// Generate (or look up) the outcome forecast for one contest.
    async fn fetch_prediction(&self, request: &PredictionRequest) -> Result<PredictionOutcome>;

    /// The full server-ranked upcoming predictions feed.
    async fn fetch_upcoming(&self) -> Result<Vec<UpcomingPrediction>>;
}
