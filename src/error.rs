use chrono::NaiveDate;
use thiserror::Error;

/// Failure taxonomy of the sync core. Every network outcome is modeled as
/// an explicit state transition plus at most one of these signals; nothing
/// in the core panics or aborts the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The schedule fetch for a date failed; an empty sequence was cached
    /// under that key and a later navigation back may retry.
    #[error("schedule fetch failed for {date}")]
    ScheduleFetchFailed { date: NaiveDate },

    /// A user-initiated prediction request failed. The entry is left in a
    /// retriable state, not poisoned.
    #[error("prediction for contest {contest_id} failed: {reason}")]
    PredictionFailed { contest_id: String, reason: String },

    /// The upcoming feed could not be refreshed; the previous entries are
    /// retained unchanged.
    #[error("upcoming predictions feed refresh failed")]
    FeedRefreshFailed,

    /// Navigation to a date before the configured floor was rejected.
    /// Only emitted when the past-date navigation restriction is enabled.
    #[error("navigation to past date {date} is disabled")]
    PastDateRejected { date: NaiveDate },
}
