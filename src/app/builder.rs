//! Builder for [`CalorieApp`].

use std::sync::Arc;

use super::CalorieApp;
use crate::cache::{CacheConfig, Clock, DailyIntakeCache, SweepTask, SystemClock};
use crate::events::IntakeEvents;
use crate::repository::{FoodRepository, InMemoryRepository, IntakeRepository, UserRepository};
use crate::service::{DailyIntakeService, FoodService, UserService};
use crate::Result;

/// Main entry point for creating an application.
pub struct CalorieCounter;

impl CalorieCounter {
    /// Create a new builder with default cache settings and an in-memory
    /// repository.
    pub fn builder() -> CalorieCounterBuilder {
        CalorieCounterBuilder::new()
    }
}

struct Repositories {
    users: Arc<dyn UserRepository>,
    foods: Arc<dyn FoodRepository>,
    intakes: Arc<dyn IntakeRepository>,
}

/// Builder for configuring a [`CalorieApp`].
pub struct CalorieCounterBuilder {
    cache_config: CacheConfig,
    clock: Option<Arc<dyn Clock>>,
    repositories: Option<Repositories>,
    sweep: bool,
}

impl Default for CalorieCounterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CalorieCounterBuilder {
    pub fn new() -> Self {
        Self {
            cache_config: CacheConfig::default(),
            clock: None,
            repositories: None,
            sweep: true,
        }
    }

    /// Set TTLs, size caps and the sweep interval.
    pub fn cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    /// Time source for cache expiry and default intake dates.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Use `store` for users, foods and intakes.
    pub fn repository<R>(mut self, store: Arc<R>) -> Self
    where
        R: UserRepository + FoodRepository + IntakeRepository + 'static,
    {
        self.repositories = Some(Repositories {
            users: store.clone(),
            foods: store.clone(),
            intakes: store,
        });
        self
    }

    /// Don't start the background sweep. Expired entries are then only
    /// reclaimed by explicit [`DailyIntakeCache::sweep_expired`] calls and
    /// size-cap eviction.
    pub fn disable_sweep(mut self) -> Self {
        self.sweep = false;
        self
    }

    /// Build the application.
    ///
    /// # Errors
    ///
    /// `Configuration` if the cache config is invalid, or if the sweep is
    /// enabled and no Tokio runtime is running.
    pub fn build(self) -> Result<CalorieApp> {
        self.cache_config.validate()?;

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let repositories = self.repositories.unwrap_or_else(|| {
            let store = Arc::new(InMemoryRepository::new());
            Repositories {
                users: store.clone(),
                foods: store.clone(),
                intakes: store,
            }
        });

        let cache = Arc::new(DailyIntakeCache::with_clock(
            &self.cache_config,
            clock.clone(),
        ));
        let events = Arc::new(IntakeEvents::new());
        events.subscribe(cache.clone());

        let sweep = if self.sweep {
            Some(SweepTask::spawn(
                cache.clone(),
                self.cache_config.sweep_interval,
            )?)
        } else {
            None
        };

        Ok(CalorieApp {
            intakes: DailyIntakeService::new(
                repositories.users.clone(),
                repositories.foods.clone(),
                repositories.intakes.clone(),
                cache.clone(),
                events.clone(),
                clock,
            ),
            users: UserService::new(
                repositories.users,
                repositories.intakes.clone(),
                cache.clone(),
            ),
            foods: FoodService::new(repositories.foods, repositories.intakes, cache.clone()),
            cache,
            events,
            sweep,
        })
    }
}
