//! Tests for intake deletion events and the cache's reaction to them.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use calorie_counter::cache::{CacheConfig, DailyIntakeCache};
use calorie_counter::events::{IntakeDeleted, IntakeEventListener, IntakeEvents};
use calorie_counter::types::{DailyIntake, NutritionMap, nutrient};

const USER: &str = "ada@example.com";

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

fn intake(id: i64) -> DailyIntake {
    let mut intake = DailyIntake::new(1, USER, date());
    intake.id = id;
    intake
}

fn nutrition() -> NutritionMap {
    NutritionMap::from([(nutrient::CALORIES.to_string(), 640.0)])
}

fn subscribed_cache() -> (Arc<DailyIntakeCache>, IntakeEvents) {
    let cache = Arc::new(DailyIntakeCache::new(&CacheConfig::default()));
    let events = IntakeEvents::new();
    events.subscribe(cache.clone());
    (cache, events)
}

#[test]
fn deletion_evicts_dated_and_nutrition_entries() {
    let (cache, events) = subscribed_cache();
    cache.put_intakes_for_date(USER, date(), &[intake(5)]);
    cache.put_user_intakes(USER, &[intake(5)]);
    cache.put_daily_nutrition(USER, date(), &nutrition());
    cache.put_intake_nutrition(5, &nutrition());

    let notified = events.publish_deleted(&IntakeDeleted {
        user: USER.to_string(),
        date: date(),
        intake_id: 5,
    });

    assert_eq!(notified, 1);
    assert!(cache.intakes_for_date(USER, date()).is_none());
    assert!(cache.daily_nutrition(USER, date()).is_none());
    assert!(cache.intake_nutrition(5).is_none());
    // The undated list is left to expire on its own.
    assert!(cache.user_intakes(USER).is_some());
}

#[test]
fn deletion_leaves_other_dates_and_intakes() {
    let (cache, events) = subscribed_cache();
    let other_day = date().succ_opt().unwrap();
    cache.put_intakes_for_date(USER, other_day, &[intake(6)]);
    cache.put_daily_nutrition(USER, other_day, &nutrition());
    cache.put_intake_nutrition(6, &nutrition());

    events.publish_deleted(&IntakeDeleted {
        user: USER.to_string(),
        date: date(),
        intake_id: 5,
    });

    assert!(cache.intakes_for_date(USER, other_day).is_some());
    assert!(cache.daily_nutrition(USER, other_day).is_some());
    assert!(cache.intake_nutrition(6).is_some());
}

#[test]
fn deletion_for_uncached_intake_is_harmless() {
    let (cache, events) = subscribed_cache();
    events.publish_deleted(&IntakeDeleted {
        user: USER.to_string(),
        date: date(),
        intake_id: 1,
    });
    assert_eq!(cache.stats().total(), 0);
}

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<IntakeDeleted>>,
}

impl IntakeEventListener for Recorder {
    fn on_intake_deleted(&self, event: &IntakeDeleted) {
        self.events.lock().unwrap().push(event.clone());
    }
}

#[test]
fn cache_and_other_listeners_see_the_same_event() {
    let (cache, events) = subscribed_cache();
    let recorder = Arc::new(Recorder::default());
    events.subscribe(recorder.clone());
    cache.put_intake_nutrition(3, &nutrition());

    let event = IntakeDeleted {
        user: USER.to_string(),
        date: date(),
        intake_id: 3,
    };
    assert_eq!(events.publish_deleted(&event), 2);

    assert!(cache.intake_nutrition(3).is_none());
    assert_eq!(*recorder.events.lock().unwrap(), vec![event]);
}
