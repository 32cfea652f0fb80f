//! Core module - shared infrastructure for Scout
//!
//! This module contains foundational types, configuration, and error handling
//! used throughout the application.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, Credentials};
pub use error::{Result, ScoutError};
pub use types::*;
