//! Date-indexed schedule cache and date navigator.
//!
//! Contests are stored under the date-key they were fetched for, never
//! under "whatever date is selected now". That keeps out-of-order
//! responses safe: a slow answer for date A landing after the user moved
//! to date B is still cached for a later revisit of A, but cannot touch
//! B's displayed contests or loading flag.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::PredictionApi;
use crate::error::SyncError;
use crate::models::ContestSummary;

/// Shared handle over the schedule cache state.
#[derive(Clone)]
pub struct ScheduleCache {
    api: Arc<dyn PredictionApi>,
    /// Navigation floor; dates strictly before it are rejected.
    /// `None` disables the restriction (deployment-dependent policy).
    earliest: Option<NaiveDate>,
    inner: Arc<RwLock<ScheduleInner>>,
}

struct ScheduleInner {
    selected_date: NaiveDate,
    /// Dates with a fetch currently in flight
    in_flight: HashSet<NaiveDate>,
    /// Dates whose last fetch failed; cached as empty but eligible for refetch
    failed: HashSet<NaiveDate>,
    /// date-key → contests in server response order
    by_date: HashMap<NaiveDate, Vec<ContestSummary>>,
}

impl ScheduleCache {
    pub fn new(
        api: Arc<dyn PredictionApi>,
        start_date: NaiveDate,
        earliest: Option<NaiveDate>,
    ) -> Self {
        ScheduleCache {
            api,
            earliest,
            inner: Arc::new(RwLock::new(ScheduleInner {
                selected_date: start_date,
                in_flight: HashSet::new(),
                failed: HashSet::new(),
                by_date: HashMap::new(),
            })),
        }
    }

    /// Select `date` and fetch its schedule unless that date-key is already
    /// cached or a fetch for it is already in flight.
    pub async fn set_date(&self, date: NaiveDate) -> Result<(), SyncError> {
        {
            let mut inner = self.inner.write().await;
            if let Some(floor) = self.earliest {
                if date < floor {
                    return Err(SyncError::PastDateRejected { date });
                }
            }
            inner.selected_date = date;

            let cached_ok = inner.by_date.contains_key(&date) && !inner.failed.contains(&date);
            if cached_ok || inner.in_flight.contains(&date) {
                return Ok(());
            }
            inner.in_flight.insert(date);
        }

        let fetched = self.api.fetch_schedule(date).await;

        // Store strictly under the originating date-key. The user may have
        // navigated elsewhere while the request was out.
        let mut inner = self.inner.write().await;
        inner.in_flight.remove(&date);
        match fetched {
            Ok(contests) => {
                debug!("Schedule {}: {} contest(s)", date, contests.len());
                inner.failed.remove(&date);
                inner.by_date.insert(date, contests);
                Ok(())
            }
            Err(e) => {
                warn!("Schedule fetch for {} failed: {:#}", date, e);
                inner.failed.insert(date);
                inner.by_date.insert(date, Vec::new());
                Err(SyncError::ScheduleFetchFailed { date })
            }
        }
    }

    /// Move the selected date by `delta_days` (negative = back).
    pub async fn shift_date(&self, delta_days: i64) -> Result<(), SyncError> {
        let target = self.selected_date().await + chrono::Duration::days(delta_days);
        self.set_date(target).await
    }

    pub async fn selected_date(&self) -> NaiveDate {
        self.inner.read().await.selected_date
    }

    /// True only while a fetch for the currently selected date is outstanding.
    pub async fn loading(&self) -> bool {
        let inner = self.inner.read().await;
        inner.in_flight.contains(&inner.selected_date)
    }

    /// Contests cached for the selected date, or empty if never fetched or
    /// the fetch failed. Absence of data is not an error here.
    pub async fn contests_for_selected(&self) -> Vec<ContestSummary> {
        let inner = self.inner.read().await;
        inner
            .by_date
            .get(&inner.selected_date)
            .cloned()
            .unwrap_or_default()
    }
}
