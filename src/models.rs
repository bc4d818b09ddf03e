use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single scheduled contest as served by the schedule endpoint.
///
/// Immutable once cached: scores are whatever the server reported at fetch
/// time; a fresh fetch for the same date is the only way to see updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestSummary {
    /// Server-assigned contest ID, unique across the whole system
    pub contest_id: String,
    /// Calendar day the contest was fetched under
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    /// Raw tip-off string exactly as served (e.g. "7:00 pm ET"); cleaned
    /// for display by `timefmt::clean_start_time`
    pub start_time: String,
    pub status: ContestStatus,
    /// Present only once the server has reported a score
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContestStatus {
    Scheduled,
    Final,
}

/// The minimal context the predict endpoint needs; it does not look up
/// contests itself. Field names match the wire body of the POST variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    #[serde(rename = "game_id")]
    pub contest_id: String,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
}

/// A resolved machine-generated outcome forecast for one contest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub winner: String,
    /// Integer percentage, 0–100
    pub confidence: u8,
    pub explanation: String,
    pub pred_home_score: i32,
    pub pred_away_score: i32,
}

/// Per-contest prediction lifecycle. `Unrequested` is never stored; it is
/// the read-side default for ids the cache has never seen.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionEntry {
    Unrequested,
    /// A request is in flight; no second request may be issued
    Pending,
    /// Sticky: never re-fetched for the lifetime of the cache
    Resolved(PredictionOutcome),
    /// Retriable: a later explicit request may issue a new call
    Failed(String),
}

/// Denormalized entry of the server-ranked upcoming predictions feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingPrediction {
    pub game_date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub predicted_winner: String,
    pub confidence: u8,
    pub pred_home_score: i32,
    pub pred_away_score: i32,
}

/// Cross-component notifications. The prediction cache emits these; the
/// upcoming-feed listener consumes them. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    PredictionResolved(String),
}
