//! Application wiring.
//!
//! [`CalorieCounter::builder`] constructs the cache, the intake event
//! channel, the repositories and the services exactly once, subscribes the
//! cache to intake deletions, and owns the background sweep.

mod builder;

pub use builder::{CalorieCounter, CalorieCounterBuilder};

use std::sync::Arc;

use tracing::info;

use crate::cache::{DailyIntakeCache, SweepTask};
use crate::events::IntakeEvents;
use crate::service::{DailyIntakeService, FoodService, UserService};

/// A fully wired calorie counter.
///
/// Dropping it aborts the sweep task; call [`shutdown`](Self::shutdown) to
/// stop it cleanly.
#[derive(Debug)]
pub struct CalorieApp {
    intakes: DailyIntakeService,
    users: UserService,
    foods: FoodService,
    cache: Arc<DailyIntakeCache>,
    events: Arc<IntakeEvents>,
    sweep: Option<SweepTask>,
}

impl CalorieApp {
    pub fn intakes(&self) -> &DailyIntakeService {
        &self.intakes
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    pub fn foods(&self) -> &FoodService {
        &self.foods
    }

    pub fn cache(&self) -> &Arc<DailyIntakeCache> {
        &self.cache
    }

    pub fn events(&self) -> &Arc<IntakeEvents> {
        &self.events
    }

    /// Whether the background sweep is running.
    pub fn sweep_running(&self) -> bool {
        self.sweep.as_ref().is_some_and(SweepTask::is_running)
    }

    /// Stop the background sweep and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(sweep) = self.sweep.take() {
            sweep.shutdown().await;
        }
        info!(stats = ?self.cache.stats(), "calorie counter shut down");
    }
}
