use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use courtside::api::{HttpApi, PredictionApi};
use courtside::config::Config;
use courtside::models::{PredictionEntry, PredictionRequest};
use courtside::sync::{
    core_event_channel, start_feed_listener, PredictionCache, ScheduleCache, UpcomingFeed,
};
use courtside::timefmt;

// The caches are single-writer by protocol (check-and-set before every
// suspension point), so one cooperative thread is all the runtime needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let api: Arc<dyn PredictionApi> = Arc::new(HttpApi::new(
        &config.api_url,
        config.predict_style,
        config.feed_limit,
        Duration::from_secs(config.request_timeout_secs),
    )?);
    info!("Backend: {}", config.api_url);

    let today = Utc::now().date_naive();
    let navigation_floor = config.future_only.then_some(today);

    let (events, rx) = core_event_channel();
    let schedule = ScheduleCache::new(Arc::clone(&api), today, navigation_floor);
    let predictions = PredictionCache::new(Arc::clone(&api), events);
    let feed = UpcomingFeed::new(Arc::clone(&api));
    let listener = start_feed_listener(feed.clone(), rx);

    // Initial sync: current feed plus today's schedule. Neither failure is
    // fatal; the caches fall back to empty and can be retried by navigating.
    if let Err(e) = feed.refresh().await {
        warn!("Initial feed refresh failed: {}", e);
    }
    if let Err(e) = schedule.set_date(today).await {
        warn!("Initial schedule load failed: {}", e);
    }

    let contests = schedule.contests_for_selected().await;
    info!(
        "{}: {} contest(s) scheduled",
        timefmt::display_date(today),
        contests.len()
    );
    for contest in &contests {
        info!(
            "  {} {}: {} @ {}",
            contest.contest_id,
            timefmt::clean_start_time(&contest.start_time),
            contest.away_team,
            contest.home_team
        );
    }

    if let Some(contest_id) = &config.predict_contest {
        match contests.iter().find(|c| &c.contest_id == contest_id) {
            Some(contest) => {
                let request = PredictionRequest {
                    contest_id: contest.contest_id.clone(),
                    date: contest.date,
                    home_team: contest.home_team.clone(),
                    away_team: contest.away_team.clone(),
                };
                if let Err(e) = predictions.request(&request).await {
                    warn!("{}", e);
                }
                if let PredictionEntry::Resolved(outcome) = predictions.get(contest_id).await {
                    info!(
                        "Prediction for {}: {} wins ({}%), projected {}-{}: {}",
                        contest_id,
                        outcome.winner,
                        outcome.confidence,
                        outcome.pred_home_score,
                        outcome.pred_away_score,
                        outcome.explanation
                    );
                }
            }
            None => warn!("Contest {} is not on today's schedule", contest_id),
        }
    }

    // Dropping the last event sender lets the listener drain any pending
    // post-prediction refresh and exit.
    drop(predictions);
    let _ = listener.await;

    let upcoming = feed.entries().await;
    info!("Upcoming predictions feed: {} entr(ies)", upcoming.len());
    for entry in &upcoming {
        info!(
            "  {}: {} @ {}, {} ({}%)",
            timefmt::date_key(entry.game_date),
            entry.away_team,
            entry.home_team,
            entry.predicted_winner,
            entry.confidence
        );
    }

    Ok(())
}
