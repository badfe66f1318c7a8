//! calorie-counter - calorie-tracking service core
//!
//! Users, foods and daily intake records live behind async repository
//! traits. Reads of intake lists and nutrition totals go through
//! [`DailyIntakeCache`], a four-table TTL cache with size caps, a background
//! expiry sweep, and invalidation driven by intake deletion events.
//!
//! # Example
//!
//! ```rust,no_run
//! use calorie_counter::{CalorieCounter, Food, FoodEntry, User};
//!
//! #[tokio::main]
//! async fn main() -> calorie_counter::Result<()> {
//!     let app = CalorieCounter::builder().build()?;
//!
//!     let user = app.users().create_user(User::new("Ada", "L", "ada@example.com")).await?;
//!     let oats = Food::new("oats", 380.0).with_macros(13.0, 7.0, 60.0);
//!     let oats = app.foods().create_food(oats).await?;
//!
//!     let intake = app
//!         .intakes()
//!         .create_intake(user.id, None, &[FoodEntry::new(oats.id, 80.0)])
//!         .await?;
//!
//!     // First call fills the cache, the second is served from it.
//!     let nutrition = app.intakes().get_daily_nutrition(&user.email, intake.date).await?;
//!     let again = app.intakes().get_daily_nutrition(&user.email, intake.date).await?;
//!     assert_eq!(nutrition, again);
//!     println!("{} kcal", nutrition.calories);
//!
//!     app.shutdown().await;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cache;
pub mod error;
pub mod events;
pub mod repository;
#[cfg(feature = "server")]
pub mod server;
pub mod service;
pub mod telemetry;
pub mod types;
pub mod version;

// Re-export main types at crate root
pub use app::{CalorieApp, CalorieCounter, CalorieCounterBuilder};
pub use cache::{CacheConfig, DailyIntakeCache, IntakeList, TableConfig};
pub use error::{CalorieError, Result};
pub use events::{IntakeDeleted, IntakeEventListener, IntakeEvents};
pub use repository::{FoodRepository, InMemoryRepository, IntakeRepository, UserRepository};
pub use service::{DailyIntakeService, FoodService, UserService};
pub use version::{PKG_VERSION, version_string};

// Re-export all types
pub use types::{
    BatchFoodAddResponse, DailyIntake, DailyNutrition, Food, FoodAddRequest, FoodAddResult,
    FoodEntry, FoodId, IntakeId, IntakeItem, NutritionMap, User, UserId,
};
