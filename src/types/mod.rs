//! Public types for the calorie counter API.

mod food;
mod intake;
mod nutrition;
mod user;

pub use food::{Food, FoodId};
pub use intake::{
    BatchFoodAddResponse, DailyIntake, FoodAddRequest, FoodAddResult, FoodEntry, IntakeId,
    IntakeItem,
};
pub use nutrition::{DailyNutrition, NutritionMap, nutrient};
pub use user::{User, UserId};
