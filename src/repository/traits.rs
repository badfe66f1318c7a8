//! Repository traits for users, foods and intakes.
//!
//! Each entity gets its own trait rather than one store-wide interface, so a
//! deployment can back them with different stores and tests can fake just
//! the one they need. Every method is async and fallible; storage faults
//! surface as [`CalorieError::Storage`](crate::CalorieError::Storage).

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::Result;
use crate::types::{
    DailyIntake, DailyNutrition, Food, FoodId, IntakeId, NutritionMap, User, UserId,
};

// ============================================================================
// Users
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn exists_by_email(&self, email: &str) -> Result<bool> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn find_all(&self) -> Result<Vec<User>>;

    /// Insert (id `0`) or replace a user. Returns the stored record.
    async fn save(&self, user: User) -> Result<User>;

    /// Returns `false` if no such user existed.
    async fn delete(&self, id: UserId) -> Result<bool>;
}

// ============================================================================
// Foods
// ============================================================================

#[async_trait]
pub trait FoodRepository: Send + Sync {
    async fn find_by_id(&self, id: FoodId) -> Result<Option<Food>>;

    async fn find_all(&self) -> Result<Vec<Food>>;

    async fn exists_by_name(&self, name: &str) -> Result<bool>;

    /// Insert (id `0`) or replace a food. Returns the stored record.
    async fn save(&self, food: Food) -> Result<Food>;

    async fn delete(&self, id: FoodId) -> Result<bool>;
}

// ============================================================================
// Intakes
// ============================================================================

#[async_trait]
pub trait IntakeRepository: Send + Sync {
    async fn find_by_id(&self, id: IntakeId) -> Result<Option<DailyIntake>>;

    async fn find_all(&self) -> Result<Vec<DailyIntake>>;

    /// Insert (id `0`) or replace an intake. Returns the stored record.
    async fn save(&self, intake: DailyIntake) -> Result<DailyIntake>;

    async fn delete(&self, id: IntakeId) -> Result<bool>;

    /// Intakes for a user on one date.
    async fn find_user_intakes_with_date(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> Result<Vec<DailyIntake>>;

    /// All intakes for a user, newest date first.
    async fn find_user_intakes(&self, email: &str) -> Result<Vec<DailyIntake>>;

    /// Intakes containing at least one portion of `food_id`.
    async fn find_by_food(&self, food_id: FoodId) -> Result<Vec<DailyIntake>>;

    /// Delete every intake owned by `user_id`. Returns how many were removed.
    async fn delete_all_by_user(&self, user_id: UserId) -> Result<usize>;

    /// Nutrition totals for a user's date, or `None` if nothing was eaten.
    ///
    /// Default implementation aggregates
    /// [`find_user_intakes_with_date`](Self::find_user_intakes_with_date); stores
    /// with server-side aggregation should override it.
    async fn calculate_daily_nutrition(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> Result<Option<NutritionMap>> {
        let intakes = self.find_user_intakes_with_date(email, date).await?;
        let mut items = intakes.iter().flat_map(|intake| &intake.items).peekable();
        if items.peek().is_none() {
            return Ok(None);
        }
        Ok(Some(DailyNutrition::from_items(items).to_map()))
    }

    /// Nutrition totals for one intake, or `None` if the intake does not exist.
    async fn calculate_intake_nutrition(&self, id: IntakeId) -> Result<Option<NutritionMap>> {
        Ok(self
            .find_by_id(id)
            .await?
            .map(|intake| DailyNutrition::from_items(&intake.items).to_map()))
    }
}
