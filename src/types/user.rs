//! User records.

use serde::{Deserialize, Serialize};

/// Repository-assigned user identifier.
pub type UserId = i64;

/// A registered user.
///
/// The email is the user's identity as far as the intake cache is concerned:
/// every user-scoped cache table is keyed on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Assigned on first save; `0` for an unsaved user.
    #[serde(default)]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub gender: String,
    pub email: String,
    /// Body weight in kilograms.
    pub weight: u32,
    /// Height in centimetres.
    pub height: u32,
}

impl User {
    /// Create an unsaved user with the given name and email.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            age: 0,
            gender: String::new(),
            email: email.into(),
            weight: 0,
            height: 0,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = age;
        self
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    /// Set body measurements (kilograms, centimetres).
    pub fn with_measurements(mut self, weight: u32, height: u32) -> Self {
        self.weight = weight;
        self.height = height;
        self
    }
}
