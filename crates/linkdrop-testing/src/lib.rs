//! Test utilities for Linkdrop services.
//!
//! Provides `MockAdmin` (signed session cookies without a login round-trip) and clock helpers.
//! Import from dev-dependencies only — never in production code.

pub mod auth;
pub mod clock;
