//! Coupon domain types.

use serde::{Deserialize, Serialize};

use crate::pagination::Sort;

/// Provenance of a coupon. Informational only; never affects claim rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponSource {
    /// Entered by an admin, one at a time or as a bulk list.
    Added,
    /// Created from an uploaded line-delimited text.
    Imported,
    /// Created from the stored link pool.
    Generated,
}

impl CouponSource {
    /// Storage value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Imported => "imported",
            Self::Generated => "generated",
        }
    }

    /// Parse a storage value. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "added" => Some(Self::Added),
            "imported" => Some(Self::Imported),
            "generated" => Some(Self::Generated),
            _ => None,
        }
    }
}

/// Derived lifecycle state of a coupon as seen by listings and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponStatus {
    Available,
    Claimed,
    Expired,
}

impl CouponStatus {
    /// A claimed coupon stays `Claimed` even after its expiry passes.
    pub fn derive(is_claimed: bool, is_past_expiry: bool) -> Self {
        match (is_claimed, is_past_expiry) {
            (true, _) => Self::Claimed,
            (false, true) => Self::Expired,
            (false, false) => Self::Available,
        }
    }
}

/// Sort order for the `GET /coupons` listing.
///
/// Wire format is a single hyphenated string (e.g. `"created-at-desc"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponSortBy {
    CreatedAt(Sort),
    ExpiresAt(Sort),
}

impl Default for CouponSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl<'de> Deserialize<'de> for CouponSortBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "created-at-desc" => Ok(Self::CreatedAt(Sort::Desc)),
            "created-at-asc" => Ok(Self::CreatedAt(Sort::Asc)),
            "expires-at-desc" => Ok(Self::ExpiresAt(Sort::Desc)),
            "expires-at-asc" => Ok(Self::ExpiresAt(Sort::Asc)),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &[
                    "created-at-desc",
                    "created-at-asc",
                    "expires-at-desc",
                    "expires-at-asc",
                ],
            )),
        }
    }
}
