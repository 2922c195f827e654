//! Configuration module for mdremix
//!
//! This module handles user preferences, including JSON serialization and
//! persistent storage in the platform config directory.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
