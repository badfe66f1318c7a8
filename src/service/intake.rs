//! Daily intake service.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use super::{evict_intake, validate_email, validate_weight};
use crate::cache::{Clock, DailyIntakeCache, IntakeList};
use crate::events::{IntakeDeleted, IntakeEvents};
use crate::repository::{FoodRepository, IntakeRepository, UserRepository};
use crate::types::{
    BatchFoodAddResponse, DailyIntake, DailyNutrition, Food, FoodAddRequest, FoodAddResult,
    FoodEntry, FoodId, IntakeId, IntakeItem, UserId,
};
use crate::{CalorieError, Result};

/// Intake reads, served from [`DailyIntakeCache`] when possible, and intake
/// mutations, which evict what they touch.
pub struct DailyIntakeService {
    users: Arc<dyn UserRepository>,
    foods: Arc<dyn FoodRepository>,
    intakes: Arc<dyn IntakeRepository>,
    cache: Arc<DailyIntakeCache>,
    events: Arc<IntakeEvents>,
    clock: Arc<dyn Clock>,
}

impl DailyIntakeService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        foods: Arc<dyn FoodRepository>,
        intakes: Arc<dyn IntakeRepository>,
        cache: Arc<DailyIntakeCache>,
        events: Arc<IntakeEvents>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            foods,
            intakes,
            cache,
            events,
            clock,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// A user's intakes on `date`, or all of them (newest first) when `date`
    /// is `None`.
    pub async fn get_user_intakes(
        &self,
        email: &str,
        date: Option<NaiveDate>,
    ) -> Result<IntakeList> {
        validate_email(email)?;
        match date {
            Some(date) => {
                if let Some(hit) = self.cache.intakes_for_date(email, date) {
                    return Ok(hit);
                }
                let intakes = self.intakes.find_user_intakes_with_date(email, date).await?;
                self.cache.put_intakes_for_date(email, date, &intakes);
                Ok(intakes.into())
            }
            None => {
                if let Some(hit) = self.cache.user_intakes(email) {
                    return Ok(hit);
                }
                let intakes = self.intakes.find_user_intakes(email).await?;
                self.cache.put_user_intakes(email, &intakes);
                Ok(intakes.into())
            }
        }
    }

    /// Nutrition totals for everything a user ate on `date`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user recorded no food that day.
    pub async fn get_daily_nutrition(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> Result<DailyNutrition> {
        validate_email(email)?;
        if let Some(hit) = self.cache.daily_nutrition(email, date) {
            return Ok(DailyNutrition::from(hit.as_ref()));
        }
        let map = self
            .intakes
            .calculate_daily_nutrition(email, date)
            .await?
            .ok_or_else(|| {
                CalorieError::NotFound(format!(
                    "Nutrition data not found for user {email} on {date}"
                ))
            })?;
        self.cache.put_daily_nutrition(email, date, &map);
        Ok(DailyNutrition::from(&map))
    }

    pub async fn get_nutrition_for_intake(&self, intake_id: IntakeId) -> Result<DailyNutrition> {
        if let Some(hit) = self.cache.intake_nutrition(intake_id) {
            return Ok(DailyNutrition::from(hit.as_ref()));
        }
        let map = self
            .intakes
            .calculate_intake_nutrition(intake_id)
            .await?
            .ok_or_else(|| CalorieError::not_found("DailyIntake", intake_id))?;
        self.cache.put_intake_nutrition(intake_id, &map);
        Ok(DailyNutrition::from(&map))
    }

    pub async fn get_intake(&self, intake_id: IntakeId) -> Result<DailyIntake> {
        self.load_intake(intake_id).await
    }

    pub async fn get_all_intakes(&self) -> Result<Vec<DailyIntake>> {
        self.intakes.find_all().await
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Record a new intake for `user_id` on `date` (today when `None`).
    ///
    /// Entries naming the same food are merged into one item by summing
    /// their weights.
    pub async fn create_intake(
        &self,
        user_id: UserId,
        date: Option<NaiveDate>,
        entries: &[FoodEntry],
    ) -> Result<DailyIntake> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| CalorieError::not_found("User", user_id))?;
        let date = date.unwrap_or_else(|| self.clock.now().date_naive());

        let mut intake = DailyIntake::new(user.id, user.email, date);
        for entry in entries {
            validate_weight(entry.weight)?;
            self.merge_item(&mut intake, entry.food_id, entry.weight).await?;
        }
        let saved = self.intakes.save(intake).await?;

        evict_intake(&self.cache, &saved);
        info!(
            intake_id = saved.id,
            user = %saved.user_email,
            date = %saved.date,
            items = saved.items.len(),
            "created intake"
        );
        Ok(saved)
    }

    /// Add `weight` grams of a food to an existing intake.
    pub async fn add_food(
        &self,
        intake_id: IntakeId,
        food_id: FoodId,
        weight: f64,
    ) -> Result<DailyIntake> {
        validate_weight(weight)?;
        let mut intake = self.load_intake(intake_id).await?;
        self.merge_item(&mut intake, food_id, weight).await?;
        let saved = self.intakes.save(intake).await?;
        evict_intake(&self.cache, &saved);
        Ok(saved)
    }

    /// Apply [`add_food`](Self::add_food) to each request independently.
    pub async fn add_foods_batch(&self, requests: &[FoodAddRequest]) -> BatchFoodAddResponse {
        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let outcome = self
                .add_food(request.intake_id, request.food_id, request.weight)
                .await;
            results.push(match outcome {
                Ok(_) => FoodAddResult {
                    food_id: request.food_id,
                    success: true,
                    message: format!("food added to intake {}", request.intake_id),
                },
                Err(e) => {
                    warn!(
                        intake_id = request.intake_id,
                        food_id = request.food_id,
                        error = %e,
                        "batch food add failed"
                    );
                    FoodAddResult {
                        food_id: request.food_id,
                        success: false,
                        message: format!("error: {e}"),
                    }
                }
            });
        }
        BatchFoodAddResponse::from_results(results)
    }

    /// Set the weight of each listed food, appending foods the intake does
    /// not contain yet. `food_ids` and `weights` are paired by position.
    pub async fn update_intake(
        &self,
        intake_id: IntakeId,
        food_ids: &[FoodId],
        weights: &[f64],
    ) -> Result<DailyIntake> {
        if food_ids.len() != weights.len() {
            return Err(CalorieError::InvalidInput(format!(
                "{} food ids but {} weights",
                food_ids.len(),
                weights.len()
            )));
        }
        for &weight in weights {
            validate_weight(weight)?;
        }

        let mut intake = self.load_intake(intake_id).await?;
        for (&food_id, &weight) in food_ids.iter().zip(weights) {
            match intake.item_mut(food_id) {
                Some(item) => item.weight = weight,
                None => {
                    let food = self.load_food(food_id).await?;
                    intake.items.push(IntakeItem { food, weight });
                }
            }
        }
        let saved = self.intakes.save(intake).await?;
        evict_intake(&self.cache, &saved);
        Ok(saved)
    }

    /// Delete an intake. Returns `false` if it did not exist.
    ///
    /// Cache invalidation happens through the published [`IntakeDeleted`]
    /// event.
    pub async fn delete_intake(&self, intake_id: IntakeId) -> Result<bool> {
        let Some(intake) = self.intakes.find_by_id(intake_id).await? else {
            return Ok(false);
        };
        if !self.intakes.delete(intake_id).await? {
            return Ok(false);
        }
        self.events.publish_deleted(&IntakeDeleted {
            user: intake.user_email,
            date: intake.date,
            intake_id,
        });
        info!(intake_id, "deleted intake");
        Ok(true)
    }

    async fn load_intake(&self, intake_id: IntakeId) -> Result<DailyIntake> {
        self.intakes
            .find_by_id(intake_id)
            .await?
            .ok_or_else(|| CalorieError::not_found("DailyIntake", intake_id))
    }

    async fn load_food(&self, food_id: FoodId) -> Result<Food> {
        self.foods
            .find_by_id(food_id)
            .await?
            .ok_or_else(|| CalorieError::not_found("Food", food_id))
    }

    async fn merge_item(
        &self,
        intake: &mut DailyIntake,
        food_id: FoodId,
        weight: f64,
    ) -> Result<()> {
        match intake.item_mut(food_id) {
            Some(item) => item.weight += weight,
            None => {
                let food = self.load_food(food_id).await?;
                intake.items.push(IntakeItem { food, weight });
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for DailyIntakeService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyIntakeService")
            .field("cache", &self.cache)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
