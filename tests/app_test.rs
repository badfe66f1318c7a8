//! Tests for application wiring and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use calorie_counter::cache::{CacheConfig, ManualClock, TableConfig};
use calorie_counter::{CalorieCounter, Food, FoodEntry, User};

#[tokio::test(start_paused = true)]
async fn sweep_runs_until_shutdown() {
    let clock = Arc::new(ManualClock::new());
    let app = CalorieCounter::builder()
        .clock(clock.clone())
        .cache_config(CacheConfig::new().sweep_interval(Duration::from_secs(30)))
        .build()
        .unwrap();
    assert!(app.sweep_running());

    let user = app
        .users()
        .create_user(User::new("Ada", "Lovelace", "ada@example.com"))
        .await
        .unwrap();
    let rice = app.foods().create_food(Food::new("rice", 130.0)).await.unwrap();
    let intake = app
        .intakes()
        .create_intake(user.id, None, &[FoodEntry::new(rice.id, 200.0)])
        .await
        .unwrap();
    app.intakes().get_user_intakes(&user.email, Some(intake.date)).await.unwrap();
    app.intakes().get_daily_nutrition(&user.email, intake.date).await.unwrap();
    assert_eq!(app.cache().stats().total(), 2);

    // Intake lists expire, nutrition totals don't yet.
    clock.advance(Duration::from_secs(11 * 60));
    tokio::time::sleep(Duration::from_secs(31)).await;
    let stats = app.cache().stats();
    assert_eq!(stats.intakes_by_date, 0);
    assert_eq!(stats.nutrition_by_date, 1);

    app.shutdown().await;
}

#[tokio::test]
async fn cache_is_subscribed_to_deletions() {
    let app = CalorieCounter::builder().disable_sweep().build().unwrap();
    assert_eq!(app.events().listener_count(), 1);
    assert!(!app.sweep_running());
    app.shutdown().await;
}

#[tokio::test]
async fn custom_table_config_is_applied() {
    let config = CacheConfig::new().intakes_by_user(TableConfig::new(Duration::from_secs(60), 1));
    let app = CalorieCounter::builder()
        .cache_config(config)
        .disable_sweep()
        .build()
        .unwrap();

    let a = app
        .users()
        .create_user(User::new("A", "A", "a@x.com"))
        .await
        .unwrap();
    let b = app
        .users()
        .create_user(User::new("B", "B", "b@x.com"))
        .await
        .unwrap();
    let rice = app.foods().create_food(Food::new("rice", 130.0)).await.unwrap();
    for user in [&a, &b] {
        app.intakes()
            .create_intake(user.id, None, &[FoodEntry::new(rice.id, 100.0)])
            .await
            .unwrap();
        app.intakes().get_user_intakes(&user.email, None).await.unwrap();
    }

    assert_eq!(app.cache().stats().intakes_by_user, 1);
    assert!(app.cache().user_intakes("a@x.com").is_none());
    assert!(app.cache().user_intakes("b@x.com").is_some());
}

#[test]
fn version_string_starts_with_pkg_version() {
    assert!(calorie_counter::version_string().starts_with(calorie_counter::PKG_VERSION));
}
