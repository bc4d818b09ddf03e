//! Scripted in-memory `PredictionApi` used by the sync-layer tests.
//!
//! Every fetch is counted so tests can assert the at-most-once protocol
//! invariants; `Notify` gates let a test hold a response in flight while
//! it drives the rest of the system.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use crate::models::{ContestSummary, PredictionOutcome, PredictionRequest, UpcomingPrediction};

use super::provider::PredictionApi;

#[derive(Default)]
pub struct MockApi {
    schedules: Mutex<HashMap<NaiveDate, Vec<ContestSummary>>>,
    failing_dates: Mutex<Vec<NaiveDate>>,
    schedule_gates: Mutex<HashMap<NaiveDate, Arc<Notify>>>,
    schedule_calls: Mutex<HashMap<NaiveDate, usize>>,

    predict_responses: Mutex<VecDeque<Result<PredictionOutcome, String>>>,
    predict_gate: Mutex<Option<Arc<Notify>>>,
    predict_calls: AtomicUsize,

    upcoming_responses: Mutex<VecDeque<Result<Vec<UpcomingPrediction>, String>>>,
    upcoming_calls: AtomicUsize,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(MockApi::default())
    }

    pub fn put_schedule(&self, date: NaiveDate, contests: Vec<ContestSummary>) {
        self.schedules.lock().unwrap().insert(date, contests);
    }

    /// Make the next fetches for `date` fail with a network-ish error.
    pub fn fail_schedule(&self, date: NaiveDate) {
        self.failing_dates.lock().unwrap().push(date);
    }

    pub fn clear_schedule_failure(&self, date: NaiveDate) {
        self.failing_dates.lock().unwrap().retain(|d| *d != date);
    }

    /// Hold every fetch for `date` until the returned gate is notified.
    pub fn gate_schedule(&self, date: NaiveDate) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.schedule_gates
            .lock()
            .unwrap()
            .insert(date, Arc::clone(&gate));
        gate
    }

    pub fn schedule_calls(&self, date: NaiveDate) -> usize {
        self.schedule_calls
            .lock()
            .unwrap()
            .get(&date)
            .copied()
            .unwrap_or(0)
    }

    pub fn script_prediction(&self, outcome: PredictionOutcome) {
        self.predict_responses.lock().unwrap().push_back(Ok(outcome));
    }

    pub fn script_prediction_error(&self, reason: &str) {
        self.predict_responses
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
    }

    /// Hold every prediction fetch until the returned gate is notified.
    pub fn gate_predictions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.predict_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn predict_calls(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }

    pub fn script_upcoming(&self, entries: Vec<UpcomingPrediction>) {
        self.upcoming_responses
            .lock()
            .unwrap()
            .push_back(Ok(entries));
    }

    pub fn script_upcoming_error(&self, reason: &str) {
        self.upcoming_responses
            .lock()
            .unwrap()
            .push_back(Err(reason.to_string()));
    }

    pub fn upcoming_calls(&self) -> usize {
        self.upcoming_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionApi for MockApi {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_schedule(&self, date: NaiveDate) -> Result<Vec<ContestSummary>> {
        *self
            .schedule_calls
            .lock()
            .unwrap()
            .entry(date)
            .or_insert(0) += 1;

        // Clone the gate out so no lock is held across the await
        let gate = self.schedule_gates.lock().unwrap().get(&date).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing_dates.lock().unwrap().contains(&date) {
            return Err(anyhow!("connection refused"));
        }
        Ok(self
            .schedules
            .lock()
            .unwrap()
            .get(&date)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_prediction(&self, request: &PredictionRequest) -> Result<PredictionOutcome> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.predict_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        match self.predict_responses.lock().unwrap().pop_front() {
            Some(Ok(outcome)) => Ok(outcome),
            Some(Err(reason)) => Err(anyhow!(reason)),
            None => Err(anyhow!(
                "no scripted prediction for contest {}",
                request.contest_id
            )),
        }
    }

    async fn fetch_upcoming(&self) -> Result<Vec<UpcomingPrediction>> {
        self.upcoming_calls.fetch_add(1, Ordering::SeqCst);
        match self.upcoming_responses.lock().unwrap().pop_front() {
            Some(Ok(entries)) => Ok(entries),
            Some(Err(reason)) => Err(anyhow!(reason)),
            None => Ok(Vec::new()),
        }
    }
}
