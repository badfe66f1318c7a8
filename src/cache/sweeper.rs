//! Background expiry sweep.
//!
//! [`SweepTask`] owns a Tokio task that calls
//! [`DailyIntakeCache::sweep_expired`] on a fixed interval. The task stops
//! when [`SweepTask::shutdown`] is awaited, and is aborted if the handle is
//! dropped without shutting down.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use super::DailyIntakeCache;
use crate::{CalorieError, Result};

/// Handle to the running sweep task.
pub struct SweepTask {
    stop: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl SweepTask {
    /// Start sweeping `cache` every `interval` on the current Tokio runtime.
    ///
    /// The first sweep runs one interval after spawning. A pass that
    /// overruns delays the next one rather than bunching them up.
    ///
    /// # Errors
    ///
    /// `Configuration` if `interval` is zero or no Tokio runtime is running.
    pub fn spawn(cache: Arc<DailyIntakeCache>, interval: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(CalorieError::Configuration(
                "cache sweep interval must be greater than zero".to_string(),
            ));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            CalorieError::Configuration(format!("cache sweep needs a Tokio runtime: {e}"))
        })?;

        let (stop, mut stopped) = watch::channel(false);
        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = cache.sweep_expired();
                        if removed.total() > 0 {
                            debug!(
                                removed = removed.total(),
                                intakes_by_date = removed.intakes_by_date,
                                intakes_by_user = removed.intakes_by_user,
                                nutrition_by_date = removed.nutrition_by_date,
                                nutrition_by_intake = removed.nutrition_by_intake,
                                "swept expired cache entries"
                            );
                        }
                    }
                    changed = stopped.changed() => {
                        if changed.is_err() || *stopped.borrow() {
                            break;
                        }
                    }
                }
            }
            debug!("cache sweep stopped");
        });

        info!(interval_secs = interval.as_secs_f64(), "cache sweep started");
        Ok(Self {
            stop,
            handle: Some(handle),
            interval,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the task is still running.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal the task to stop and wait for it to exit.
    pub async fn shutdown(mut self) {
        let _ = self.stop.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for SweepTask {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl std::fmt::Debug for SweepTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepTask")
            .field("interval", &self.interval)
            .field("running", &self.is_running())
            .finish()
    }
}
