//! Tests for [`DailyIntakeCache`]: expiry, size caps, input rejection and
//! concurrent access.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use calorie_counter::cache::{CacheConfig, DailyIntakeCache, ManualClock, TableConfig};
use calorie_counter::types::{DailyIntake, IntakeId, NutritionMap, nutrient};

const USER: &str = "ada@example.com";

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn nth_date(n: i64) -> NaiveDate {
    date(1) + chrono::Days::new(n as u64)
}

fn intake(id: IntakeId, day: NaiveDate) -> DailyIntake {
    let mut intake = DailyIntake::new(1, USER, day);
    intake.id = id;
    intake
}

fn nutrition(calories: f64) -> NutritionMap {
    NutritionMap::from([(nutrient::CALORIES.to_string(), calories)])
}

fn cache_with_clock() -> (DailyIntakeCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let cache = DailyIntakeCache::with_clock(&CacheConfig::default(), clock.clone());
    (cache, clock)
}

#[test]
fn cache_miss_returns_none() {
    let (cache, _) = cache_with_clock();
    assert!(cache.intakes_for_date(USER, date(1)).is_none());
    assert!(cache.user_intakes(USER).is_none());
    assert!(cache.daily_nutrition(USER, date(1)).is_none());
    assert!(cache.intake_nutrition(42).is_none());
}

#[test]
fn dated_intakes_expire_after_ten_minutes() {
    let (cache, clock) = cache_with_clock();
    let records = [intake(1, date(1)), intake(2, date(1)), intake(3, date(1))];
    cache.put_intakes_for_date(USER, date(1), &records);

    let hit = cache.intakes_for_date(USER, date(1)).unwrap();
    assert_eq!(hit.len(), 3);
    assert_eq!(hit[2].id, 3);

    clock.advance(Duration::from_secs(11 * 60));
    assert!(cache.intakes_for_date(USER, date(1)).is_none());
}

#[test]
fn entry_is_live_exactly_at_ttl() {
    let (cache, clock) = cache_with_clock();
    cache.put_user_intakes(USER, &[intake(1, date(1))]);

    clock.advance(Duration::from_secs(10 * 60));
    assert!(cache.user_intakes(USER).is_some());

    clock.advance(Duration::from_secs(1));
    assert!(cache.user_intakes(USER).is_none());
}

#[test]
fn expired_read_does_not_remove_entry() {
    let (cache, clock) = cache_with_clock();
    cache.put_intakes_for_date(USER, date(1), &[intake(1, date(1))]);
    clock.advance(Duration::from_secs(11 * 60));

    assert!(cache.intakes_for_date(USER, date(1)).is_none());
    assert_eq!(cache.stats().intakes_by_date, 1);
}

#[test]
fn nutrition_tables_live_thirty_minutes() {
    let (cache, clock) = cache_with_clock();
    cache.put_daily_nutrition(USER, date(1), &nutrition(500.0));
    cache.put_intake_nutrition(7, &nutrition(250.0));

    clock.advance(Duration::from_secs(29 * 60));
    assert_eq!(
        cache.daily_nutrition(USER, date(1)).unwrap()[nutrient::CALORIES],
        500.0
    );
    assert!(cache.intake_nutrition(7).is_some());

    clock.advance(Duration::from_secs(2 * 60));
    assert!(cache.daily_nutrition(USER, date(1)).is_none());
    assert!(cache.intake_nutrition(7).is_none());
}

#[test]
fn overwrite_replaces_entry_and_resets_ttl() {
    let (cache, clock) = cache_with_clock();
    cache.put_intakes_for_date(USER, date(1), &[intake(1, date(1))]);
    clock.advance(Duration::from_secs(8 * 60));
    cache.put_intakes_for_date(USER, date(1), &[intake(2, date(1)), intake(3, date(1))]);
    clock.advance(Duration::from_secs(8 * 60));

    let hit = cache.intakes_for_date(USER, date(1)).unwrap();
    assert_eq!(hit.iter().map(|i| i.id).collect::<Vec<_>>(), vec![2, 3]);
}

#[test]
fn hundred_and_first_date_evicts_the_oldest() {
    let (cache, clock) = cache_with_clock();
    for n in 0..101 {
        cache.put_intakes_for_date(USER, nth_date(n), &[intake(n + 1, nth_date(n))]);
        clock.advance(Duration::from_millis(10));
    }

    assert_eq!(cache.dated_intake_entries(USER), 100);
    assert!(cache.intakes_for_date(USER, nth_date(0)).is_none());
    for n in 1..101 {
        assert!(
            cache.intakes_for_date(USER, nth_date(n)).is_some(),
            "entry {n} should survive"
        );
    }
}

#[test]
fn insertion_order_breaks_creation_time_ties() {
    // The clock never moves, so every entry has the same creation time.
    let (cache, _) = cache_with_clock();
    for n in 0..101 {
        cache.put_intakes_for_date(USER, nth_date(n), &[intake(n + 1, nth_date(n))]);
    }
    assert!(cache.intakes_for_date(USER, nth_date(0)).is_none());
    assert!(cache.intakes_for_date(USER, nth_date(1)).is_some());
    assert!(cache.intakes_for_date(USER, nth_date(100)).is_some());
}

#[test]
fn dated_cap_is_per_user() {
    let config = CacheConfig::new()
        .intakes_by_date(TableConfig::new(Duration::from_secs(600), 2));
    let cache = DailyIntakeCache::new(&config);

    for n in 0..3 {
        cache.put_intakes_for_date("a@x.com", nth_date(n), &[intake(1, nth_date(n))]);
    }
    cache.put_intakes_for_date("b@x.com", date(1), &[intake(9, date(1))]);

    assert_eq!(cache.dated_intake_entries("a@x.com"), 2);
    assert_eq!(cache.dated_intake_entries("b@x.com"), 1);
    assert_eq!(cache.stats().intakes_by_date, 3);
}

#[test]
fn flat_cap_is_global() {
    let config = CacheConfig::new()
        .nutrition_by_intake(TableConfig::new(Duration::from_secs(600), 3));
    let cache = DailyIntakeCache::new(&config);

    for id in 1..=5 {
        cache.put_intake_nutrition(id, &nutrition(id as f64));
    }
    assert_eq!(cache.stats().nutrition_by_intake, 3);
    assert!(cache.intake_nutrition(1).is_none());
    assert!(cache.intake_nutrition(2).is_none());
    assert!(cache.intake_nutrition(5).is_some());
}

#[test]
fn empty_collections_are_not_cached() {
    let (cache, _) = cache_with_clock();
    cache.put_intakes_for_date(USER, date(1), &[]);
    cache.put_user_intakes(USER, &[]);
    cache.put_daily_nutrition(USER, date(1), &NutritionMap::new());
    cache.put_intake_nutrition(1, &NutritionMap::new());

    assert_eq!(cache.stats().total(), 0);
}

#[test]
fn blank_user_is_a_no_op() {
    let (cache, _) = cache_with_clock();
    cache.put_intakes_for_date("", date(1), &[intake(1, date(1))]);
    cache.put_user_intakes("   ", &[intake(1, date(1))]);
    cache.put_daily_nutrition("\t", date(1), &nutrition(1.0));
    cache.evict_all_for_user("");

    assert_eq!(cache.stats().total(), 0);
    assert!(cache.user_intakes("   ").is_none());
    assert!(cache.daily_nutrition("\t", date(1)).is_none());
}

#[test]
fn evicting_absent_entries_is_a_no_op() {
    let (cache, _) = cache_with_clock();
    cache.evict_intakes_for_date(USER, date(1));
    cache.evict_user_intakes(USER);
    cache.evict_daily_nutrition(USER, date(1));
    cache.evict_intake_nutrition(1);
    assert_eq!(cache.stats().total(), 0);
}

#[test]
fn evict_removes_exactly_one_entry() {
    let (cache, _) = cache_with_clock();
    cache.put_intakes_for_date(USER, date(1), &[intake(1, date(1))]);
    cache.put_intakes_for_date(USER, date(2), &[intake(2, date(2))]);

    cache.evict_intakes_for_date(USER, date(1));
    assert!(cache.intakes_for_date(USER, date(1)).is_none());
    assert!(cache.intakes_for_date(USER, date(2)).is_some());
}

#[test]
fn caller_mutation_does_not_reach_cache() {
    let (cache, _) = cache_with_clock();
    let mut records = vec![intake(1, date(1))];
    cache.put_user_intakes(USER, &records);

    records.push(intake(2, date(1)));
    records[0].id = 99;

    let mut map = nutrition(100.0);
    cache.put_daily_nutrition(USER, date(1), &map);
    map.insert(nutrient::CALORIES.to_string(), 0.0);

    let cached = cache.user_intakes(USER).unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].id, 1);
    assert_eq!(
        cache.daily_nutrition(USER, date(1)).unwrap()[nutrient::CALORIES],
        100.0
    );
}

#[test]
fn sweep_removes_expired_entries_and_empty_users() {
    let (cache, clock) = cache_with_clock();
    cache.put_intakes_for_date(USER, date(1), &[intake(1, date(1))]);
    cache.put_user_intakes(USER, &[intake(1, date(1))]);
    cache.put_intake_nutrition(1, &nutrition(10.0));

    clock.advance(Duration::from_secs(11 * 60));
    cache.put_daily_nutrition(USER, date(2), &nutrition(20.0));

    let removed = cache.sweep_expired();
    assert_eq!(removed.intakes_by_date, 1);
    assert_eq!(removed.intakes_by_user, 1);
    assert_eq!(removed.nutrition_by_date, 0);
    assert_eq!(removed.nutrition_by_intake, 0);

    // The user still has a nutrition entry, but no dated intake entries.
    assert_eq!(cache.dated_intake_entries(USER), 0);
    assert_eq!(cache.cached_users(), 1);

    clock.advance(Duration::from_secs(31 * 60));
    assert_eq!(cache.sweep_expired().total(), 2);
    assert_eq!(cache.cached_users(), 0);
    assert_eq!(cache.stats().total(), 0);
}

#[test]
fn cached_users_is_the_union_of_dated_tables() {
    let (cache, _) = cache_with_clock();
    cache.put_intakes_for_date("a@x.com", date(1), &[intake(1, date(1))]);
    cache.put_daily_nutrition("b@x.com", date(1), &nutrition(300.0));
    assert_eq!(cache.cached_users(), 2);

    cache.put_daily_nutrition("a@x.com", date(1), &nutrition(200.0));
    assert_eq!(cache.cached_users(), 2);
}

#[test]
fn thread_safety() {
    use std::thread;

    let cache = Arc::new(DailyIntakeCache::new(&CacheConfig::default()));
    let mut handles = Vec::new();

    // Spawn writers
    for i in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            let user = format!("user-{i}@x.com");
            for n in 0..20 {
                cache.put_intakes_for_date(&user, nth_date(n), &[intake(n, nth_date(n))]);
                cache.put_intake_nutrition(i * 100 + n, &nutrition(n as f64));
            }
        }));
    }

    // Spawn concurrent readers and sweepers
    for i in 0..10 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            let user = format!("user-{i}@x.com");
            for n in 0..20 {
                let _ = cache.intakes_for_date(&user, nth_date(n));
                cache.sweep_expired();
            }
        }));
    }

    for h in handles {
        h.join().expect("thread panicked");
    }

    for i in 0..10 {
        assert_eq!(cache.dated_intake_entries(&format!("user-{i}@x.com")), 20);
    }
    // Concurrent puts race on the cap, but never leave the table above it.
    assert!(cache.stats().nutrition_by_intake <= 100);
}
