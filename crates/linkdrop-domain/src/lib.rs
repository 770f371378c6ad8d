//! Domain types shared across Linkdrop crates.
//!
//! This crate contains only pure types with no framework dependencies.
//! Import in `usecase/` and `domain/` layers; never in `infra/` or `handlers/`.

pub mod coupon;
pub mod id;
pub mod pagination;
