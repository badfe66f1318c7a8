//! User service.

use std::sync::Arc;

use tracing::info;

use super::validate_email;
use crate::cache::DailyIntakeCache;
use crate::repository::{IntakeRepository, UserRepository};
use crate::types::{User, UserId};
use crate::{CalorieError, Result};

/// User CRUD. Email changes and deletions flush the user's cache entries,
/// since every user-scoped table is keyed on the email.
pub struct UserService {
    users: Arc<dyn UserRepository>,
    intakes: Arc<dyn IntakeRepository>,
    cache: Arc<DailyIntakeCache>,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        intakes: Arc<dyn IntakeRepository>,
        cache: Arc<DailyIntakeCache>,
    ) -> Self {
        Self {
            users,
            intakes,
            cache,
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// `Conflict` if the email is already registered.
    pub async fn create_user(&self, mut user: User) -> Result<User> {
        validate_email(&user.email)?;
        if self.users.exists_by_email(&user.email).await? {
            return Err(CalorieError::Conflict("Email is already in use.".to_string()));
        }
        user.id = 0;
        let saved = self.users.save(user).await?;
        info!(user_id = saved.id, "created user");
        Ok(saved)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| CalorieError::not_found("User", id))
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.users.find_all().await
    }

    /// Replace a user's profile.
    pub async fn update_user(&self, id: UserId, mut user: User) -> Result<User> {
        validate_email(&user.email)?;
        let existing = self.get_user(id).await?;
        if existing.email != user.email && self.users.exists_by_email(&user.email).await? {
            return Err(CalorieError::Conflict("Email is already in use.".to_string()));
        }
        user.id = id;
        let saved = self.users.save(user).await?;
        self.cache.evict_all_for_user(&existing.email);
        Ok(saved)
    }

    /// Delete a user together with their intakes.
    pub async fn delete_user(&self, id: UserId) -> Result<()> {
        let existing = self.get_user(id).await?;
        for intake in self.intakes.find_user_intakes(&existing.email).await? {
            self.cache.evict_intake_nutrition(intake.id);
        }
        let removed = self.intakes.delete_all_by_user(id).await?;
        self.cache.evict_all_for_user(&existing.email);
        self.users.delete(id).await?;
        info!(user_id = id, intakes = removed, "deleted user");
        Ok(())
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}
