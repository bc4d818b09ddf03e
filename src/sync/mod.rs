pub mod feed;
pub mod predictions;
pub mod schedule;

pub use feed::UpcomingFeed;
pub use predictions::PredictionCache;
pub use schedule::ScheduleCache;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::models::CoreEvent;

/// Bounded so a wedged consumer degrades to dropped refresh triggers
/// instead of unbounded memory growth.
const EVENT_CHANNEL_CAPACITY: usize = 64;

pub fn core_event_channel() -> (mpsc::Sender<CoreEvent>, mpsc::Receiver<CoreEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Spawns the task that keeps the upcoming feed in step with prediction
/// resolutions: each `PredictionResolved` triggers one `refresh()`.
///
/// The trigger is one-directional and fire-and-forget: a failed refresh
/// is logged and never rolls back or blocks the prediction that caused
/// it. The task ends once every event sender is dropped.
pub fn start_feed_listener(
    feed: UpcomingFeed,
    mut events: mpsc::Receiver<CoreEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                CoreEvent::PredictionResolved(contest_id) => {
                    info!("Refreshing upcoming feed after prediction for contest {}", contest_id);
                    if let Err(e) = feed.refresh().await {
                        warn!("Post-prediction feed refresh failed: {}", e);
                    }
                }
            }
        }
    })
}
