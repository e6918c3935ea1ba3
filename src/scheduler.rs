use crate::refresher::Refresher;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Spawns the periodic refresh task. The first scheduled run happens one
/// full interval after spawn; the caller performs the initial refresh itself
/// before starting the server.
///
/// Cancellation interrupts the wait between runs, never a refresh already
/// in flight, so a cycle that has started always completes its writes.
pub fn spawn(
    refresher: Arc<Refresher>,
    period: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(period_secs = period.as_secs(), "Scheduler started");

        let mut interval = tokio::time::interval(period);
        // a refresh that overruns the period delays the next tick instead
        // of bursting
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the immediate first tick; the startup refresh already covered it
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    refresher.refresh().await;
                    // a cancel that arrived mid-refresh stops the loop here,
                    // after the cycle finished its writes
                    if token.is_cancelled() {
                        break;
                    }
                }
                _ = token.cancelled() => break,
            }
        }

        tracing::info!("Scheduler stopped");
    })
}
