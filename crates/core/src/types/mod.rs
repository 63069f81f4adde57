//! Core types for Cakewalk.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod money;
pub mod product;

pub use money::{Money, MoneyError};
pub use product::{ProductId, ProductIdError, ProductSnapshot};
