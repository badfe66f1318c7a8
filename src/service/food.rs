//! Food catalogue service.

use std::sync::Arc;

use tracing::info;

use super::evict_intake;
use crate::cache::DailyIntakeCache;
use crate::repository::{FoodRepository, IntakeRepository};
use crate::types::{Food, FoodId};
use crate::{CalorieError, Result};

/// Food CRUD. Changing or removing a food evicts the cached views of every
/// intake that contains it.
pub struct FoodService {
    foods: Arc<dyn FoodRepository>,
    intakes: Arc<dyn IntakeRepository>,
    cache: Arc<DailyIntakeCache>,
}

impl FoodService {
    pub fn new(
        foods: Arc<dyn FoodRepository>,
        intakes: Arc<dyn IntakeRepository>,
        cache: Arc<DailyIntakeCache>,
    ) -> Self {
        Self {
            foods,
            intakes,
            cache,
        }
    }

    /// Add a food to the catalogue.
    ///
    /// # Errors
    ///
    /// `Conflict` if a food with the same name exists, `InvalidInput` for a
    /// blank name or a negative or non-finite nutrient value.
    pub async fn create_food(&self, mut food: Food) -> Result<Food> {
        validate_food(&food)?;
        if self.foods.exists_by_name(&food.name).await? {
            return Err(CalorieError::Conflict(
                "Food with this name already exists.".to_string(),
            ));
        }
        food.id = 0;
        let saved = self.foods.save(food).await?;
        info!(food_id = saved.id, name = %saved.name, "created food");
        Ok(saved)
    }

    pub async fn get_food(&self, id: FoodId) -> Result<Food> {
        self.foods
            .find_by_id(id)
            .await?
            .ok_or_else(|| CalorieError::not_found("Food", id))
    }

    pub async fn list_foods(&self) -> Result<Vec<Food>> {
        self.foods.find_all().await
    }

    pub async fn update_food(&self, id: FoodId, mut food: Food) -> Result<Food> {
        validate_food(&food)?;
        let existing = self.get_food(id).await?;
        if existing.name != food.name && self.foods.exists_by_name(&food.name).await? {
            return Err(CalorieError::Conflict(
                "Food with this name already exists.".to_string(),
            ));
        }
        food.id = id;
        let saved = self.foods.save(food).await?;
        for intake in self.intakes.find_by_food(id).await? {
            evict_intake(&self.cache, &intake);
        }
        Ok(saved)
    }

    /// Remove a food from every intake that contains it, then from the
    /// catalogue.
    pub async fn delete_food(&self, id: FoodId) -> Result<()> {
        self.get_food(id).await?;
        let affected = self.intakes.find_by_food(id).await?;
        let count = affected.len();
        for mut intake in affected {
            intake.items.retain(|item| item.food.id != id);
            let saved = self.intakes.save(intake).await?;
            evict_intake(&self.cache, &saved);
        }
        self.foods.delete(id).await?;
        info!(food_id = id, intakes = count, "deleted food");
        Ok(())
    }
}

impl std::fmt::Debug for FoodService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodService").finish_non_exhaustive()
    }
}

fn validate_food(food: &Food) -> Result<()> {
    if food.name.trim().is_empty() {
        return Err(CalorieError::InvalidInput("food name must not be blank".to_string()));
    }
    let nutrients = [food.calories, food.protein, food.fats, food.carbs];
    if nutrients.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(CalorieError::InvalidInput(format!(
            "nutrient values of {} must be non-negative",
            food.name
        )));
    }
    Ok(())
}
