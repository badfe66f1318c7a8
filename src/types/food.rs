//! Food catalogue records.

use serde::{Deserialize, Serialize};

/// Repository-assigned food identifier.
pub type FoodId = i64;

/// A catalogue food. Nutrient values are per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    #[serde(default)]
    pub id: FoodId,
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    pub fats: f64,
    pub carbs: f64,
}

impl Food {
    /// Create an unsaved food with zeroed macronutrients.
    pub fn new(name: impl Into<String>, calories: f64) -> Self {
        Self {
            id: 0,
            name: name.into(),
            calories,
            protein: 0.0,
            fats: 0.0,
            carbs: 0.0,
        }
    }

    /// Set protein, fats and carbs (grams per 100 g).
    pub fn with_macros(mut self, protein: f64, fats: f64, carbs: f64) -> Self {
        self.protein = protein;
        self.fats = fats;
        self.carbs = carbs;
        self
    }
}
