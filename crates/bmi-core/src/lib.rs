//! Core types and trait definitions for the BMI tracker.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod calc;
pub mod error;
pub mod record;
pub mod store;

pub use calc::{Bmi, BmiCategory, compute};
pub use error::{Error, Result};
