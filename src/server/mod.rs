//! Daemon support for `calorie-counterd`.

pub mod config;

pub use config::Config;
