//! Donation lifecycle types and field rules.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Smallest number of bags a donation may carry.
pub const MIN_QUANTITY: i32 = 1;

/// Optional `+`, optional leading `1`, then 9 to 15 digits.
pub const PHONE_PATTERN: &str = r"^\+?1?\d{9,15}$";

/// Column widths of the `donations` table.
pub const PHONE_MAX_LEN: usize = 16;
pub const ADDRESS_MAX_LEN: usize = 255;
pub const CITY_MAX_LEN: usize = 255;
pub const ZIP_CODE_MAX_LEN: usize = 10;

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_PATTERN).expect("phone pattern compiles"));

/// Progress of a donation pickup. Advanced by staff only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl DonationStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::InProgress, Self::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// Matches [`PHONE_PATTERN`] and fits the stored column.
pub fn is_valid_phone_number(phone: &str) -> bool {
    phone.len() <= PHONE_MAX_LEN && PHONE_RE.is_match(phone)
}

pub fn is_valid_quantity(quantity: i32) -> bool {
    quantity >= MIN_QUANTITY
}
