pub mod coupon;
pub mod health;
pub mod link;
pub mod redeem;
pub mod report;
pub mod session;
