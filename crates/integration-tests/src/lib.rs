//! Integration tests for Cakewalk.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process cart engine tests (no external services)
//! cargo test -p cakewalk-integration-tests
//!
//! # HTTP API tests against a running storefront
//! cargo test -p cakewalk-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `cart_lifecycle` - Cart engine tests exercised through the library
//! - `storefront_api` - HTTP tests against a running storefront server
