//! SeaORM entities for the coupons service.

pub mod coupons;
pub mod stored_links;
