//! Single-admin session gate.
//!
//! One static credential from configuration, a signed session JWT carried in a cookie,
//! and the [`identity::AdminIdentity`] extractor that every admin endpoint requires.

pub mod cookie;
pub mod credentials;
pub mod identity;
pub mod token;
