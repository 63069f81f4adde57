//! Cakewalk Core - Shared types library.
//!
//! This crate provides common types used across all Cakewalk components:
//! - `storefront` - Public-facing e-commerce site
//! - `integration-tests` - Cross-module test suite
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Money in integer minor units, canonical product identifiers,
//!   and product snapshots

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
