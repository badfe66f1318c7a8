//! Services: read-through caching over the repositories, and eviction on
//! every mutation path.

mod food;
mod intake;
mod user;

pub use food::FoodService;
pub use intake::DailyIntakeService;
pub use user::UserService;

use crate::cache::DailyIntakeCache;
use crate::types::DailyIntake;
use crate::{CalorieError, Result};

/// Evict every cached view an edit to `intake` invalidates.
fn evict_intake(cache: &DailyIntakeCache, intake: &DailyIntake) {
    cache.evict_intakes_for_date(&intake.user_email, intake.date);
    cache.evict_user_intakes(&intake.user_email);
    cache.evict_daily_nutrition(&intake.user_email, intake.date);
    cache.evict_intake_nutrition(intake.id);
}

fn validate_weight(weight: f64) -> Result<()> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(CalorieError::InvalidInput(format!(
            "weight must be a positive number of grams, got {weight}"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(CalorieError::InvalidInput("email must not be blank".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_must_be_positive_and_finite() {
        assert!(validate_weight(150.0).is_ok());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                validate_weight(bad),
                Err(CalorieError::InvalidInput(_))
            ));
        }
    }
}
