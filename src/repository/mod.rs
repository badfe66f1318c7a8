//! Durable-store abstraction.
//!
//! Services talk to storage only through the traits in [`traits`]. The
//! crate ships [`InMemoryRepository`], which implements all three and backs
//! both the daemon and the test suite.

mod memory;
pub mod traits;

pub use memory::InMemoryRepository;
pub use traits::{FoodRepository, IntakeRepository, UserRepository};
