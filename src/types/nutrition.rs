//! Nutrition aggregates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::IntakeItem;

/// Nutrient name → amount, as computed by the repository and cached.
pub type NutritionMap = BTreeMap<String, f64>;

/// Nutrient keys used in a [`NutritionMap`].
pub mod nutrient {
    pub const CALORIES: &str = "calories";
    pub const PROTEIN: &str = "protein";
    pub const FATS: &str = "fats";
    pub const CARBS: &str = "carbs";
}

/// Nutrition totals for a day or a single intake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyNutrition {
    pub calories: f64,
    pub protein: f64,
    pub fats: f64,
    pub carbs: f64,
}

impl DailyNutrition {
    /// Sum the nutrients of the given items (`value * weight / 100`),
    /// rounded to one decimal place.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a IntakeItem>) -> Self {
        let mut total = Self::default();
        for item in items {
            let factor = item.weight / 100.0;
            total.calories += item.food.calories * factor;
            total.protein += item.food.protein * factor;
            total.fats += item.food.fats * factor;
            total.carbs += item.food.carbs * factor;
        }
        Self {
            calories: round1(total.calories),
            protein: round1(total.protein),
            fats: round1(total.fats),
            carbs: round1(total.carbs),
        }
    }

    /// Convert to the map form stored in the cache.
    pub fn to_map(self) -> NutritionMap {
        NutritionMap::from([
            (nutrient::CALORIES.to_string(), self.calories),
            (nutrient::PROTEIN.to_string(), self.protein),
            (nutrient::FATS.to_string(), self.fats),
            (nutrient::CARBS.to_string(), self.carbs),
        ])
    }
}

/// Missing nutrients read as `0.0`.
impl From<&NutritionMap> for DailyNutrition {
    fn from(map: &NutritionMap) -> Self {
        let get = |key: &str| map.get(key).copied().unwrap_or(0.0);
        Self {
            calories: get(nutrient::CALORIES),
            protein: get(nutrient::PROTEIN),
            fats: get(nutrient::FATS),
            carbs: get(nutrient::CARBS),
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
