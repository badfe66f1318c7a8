//! In-memory repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::traits::{FoodRepository, IntakeRepository, UserRepository};
use crate::types::{DailyIntake, Food, FoodId, IntakeId, User, UserId};
use crate::{CalorieError, Result};

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    foods: BTreeMap<FoodId, Food>,
    intakes: BTreeMap<IntakeId, DailyIntake>,
    last_user_id: UserId,
    last_food_id: FoodId,
    last_intake_id: IntakeId,
}

/// Process-local store implementing every repository trait.
///
/// Mirrors the relational behaviour the services rely on:
/// - ids are assigned on first save (records saved with id `0`);
/// - an intake must reference an existing user;
/// - renaming a user's email updates the email denormalised onto intakes;
/// - updating a food updates every intake portion that references it.
///
/// Because one value implements three traits with overlapping method
/// names, call it through the trait (`UserRepository::save(&repo, ..)`)
/// or via `Arc<dyn ..>`.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn save(&self, mut user: User) -> Result<User> {
        let mut state = self.state.write().await;
        if user.id == 0 {
            state.last_user_id += 1;
            user.id = state.last_user_id;
        } else if state
            .users
            .get(&user.id)
            .is_some_and(|previous| previous.email != user.email)
        {
            state
                .intakes
                .values_mut()
                .filter(|intake| intake.user_id == user.id)
                .for_each(|intake| intake.user_email.clone_from(&user.email));
        }
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: UserId) -> Result<bool> {
        Ok(self.state.write().await.users.remove(&id).is_some())
    }
}

#[async_trait]
impl FoodRepository for InMemoryRepository {
    async fn find_by_id(&self, id: FoodId) -> Result<Option<Food>> {
        Ok(self.state.read().await.foods.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Food>> {
        Ok(self.state.read().await.foods.values().cloned().collect())
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.foods.values().any(|f| f.name == name))
    }

    async fn save(&self, mut food: Food) -> Result<Food> {
        let mut state = self.state.write().await;
        if food.id == 0 {
            state.last_food_id += 1;
            food.id = state.last_food_id;
        } else {
            for intake in state.intakes.values_mut() {
                if let Some(item) = intake.item_mut(food.id) {
                    item.food = food.clone();
                }
            }
        }
        state.foods.insert(food.id, food.clone());
        Ok(food)
    }

    async fn delete(&self, id: FoodId) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.intakes.values().any(|intake| intake.contains_food(id)) {
            return Err(CalorieError::Storage(format!(
                "food {id} is still referenced by an intake"
            )));
        }
        Ok(state.foods.remove(&id).is_some())
    }
}

#[async_trait]
impl IntakeRepository for InMemoryRepository {
    async fn find_by_id(&self, id: IntakeId) -> Result<Option<DailyIntake>> {
        Ok(self.state.read().await.intakes.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<DailyIntake>> {
        Ok(self.state.read().await.intakes.values().cloned().collect())
    }

    async fn save(&self, mut intake: DailyIntake) -> Result<DailyIntake> {
        let mut state = self.state.write().await;
        let Some(owner) = state.users.get(&intake.user_id) else {
            return Err(CalorieError::Storage(format!(
                "intake references unknown user {}",
                intake.user_id
            )));
        };
        intake.user_email = owner.email.clone();
        if intake.id == 0 {
            state.last_intake_id += 1;
            intake.id = state.last_intake_id;
        }
        state.intakes.insert(intake.id, intake.clone());
        Ok(intake)
    }

    async fn delete(&self, id: IntakeId) -> Result<bool> {
        Ok(self.state.write().await.intakes.remove(&id).is_some())
    }

    async fn find_user_intakes_with_date(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> Result<Vec<DailyIntake>> {
        let state = self.state.read().await;
        Ok(state
            .intakes
            .values()
            .filter(|intake| intake.user_email == email && intake.date == date)
            .cloned()
            .collect())
    }

    async fn find_user_intakes(&self, email: &str) -> Result<Vec<DailyIntake>> {
        let state = self.state.read().await;
        let mut intakes: Vec<_> = state
            .intakes
            .values()
            .filter(|intake| intake.user_email == email)
            .cloned()
            .collect();
        intakes.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        Ok(intakes)
    }

    async fn find_by_food(&self, food_id: FoodId) -> Result<Vec<DailyIntake>> {
        let state = self.state.read().await;
        Ok(state
            .intakes
            .values()
            .filter(|intake| intake.contains_food(food_id))
            .cloned()
            .collect())
    }

    async fn delete_all_by_user(&self, user_id: UserId) -> Result<usize> {
        let mut state = self.state.write().await;
        let before = state.intakes.len();
        state.intakes.retain(|_, intake| intake.user_id != user_id);
        Ok(before - state.intakes.len())
    }
}
