//! Daily intake records and the request/response shapes around them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Food, FoodId, UserId};

/// Repository-assigned intake identifier.
pub type IntakeId = i64;

/// A portion of one food within an intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeItem {
    pub food: Food,
    /// Portion weight in grams.
    pub weight: f64,
}

/// One recorded intake for a user on a calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyIntake {
    #[serde(default)]
    pub id: IntakeId,
    pub user_id: UserId,
    /// Owner's email at the time of the last save. Kept in sync by the
    /// repository when the owner's email changes.
    pub user_email: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub items: Vec<IntakeItem>,
}

impl DailyIntake {
    /// Create an unsaved, empty intake.
    pub fn new(user_id: UserId, user_email: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: 0,
            user_id,
            user_email: user_email.into(),
            date,
            items: Vec::new(),
        }
    }

    /// Find the item for a food, if the intake already contains it.
    pub fn item_mut(&mut self, food_id: FoodId) -> Option<&mut IntakeItem> {
        self.items.iter_mut().find(|item| item.food.id == food_id)
    }

    /// Whether any item references the given food.
    pub fn contains_food(&self, food_id: FoodId) -> bool {
        self.items.iter().any(|item| item.food.id == food_id)
    }
}

/// A `(food, weight)` pair in a create-intake request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub food_id: FoodId,
    pub weight: f64,
}

impl FoodEntry {
    pub fn new(food_id: FoodId, weight: f64) -> Self {
        Self { food_id, weight }
    }
}

/// One element of a batch add-food request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodAddRequest {
    pub intake_id: IntakeId,
    pub food_id: FoodId,
    pub weight: f64,
}

/// Outcome of one element of a batch add-food request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodAddResult {
    pub food_id: FoodId,
    pub success: bool,
    pub message: String,
}

/// Aggregate outcome of a batch add-food request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFoodAddResponse {
    pub results: Vec<FoodAddResult>,
    pub success_count: usize,
    pub failed_count: usize,
}

impl BatchFoodAddResponse {
    pub(crate) fn from_results(results: Vec<FoodAddResult>) -> Self {
        let success_count = results.iter().filter(|r| r.success).count();
        let failed_count = results.len() - success_count;
        Self {
            results,
            success_count,
            failed_count,
        }
    }
}
