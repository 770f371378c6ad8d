pub mod claim;
pub mod coupon;
pub mod link_pool;
pub mod report;
