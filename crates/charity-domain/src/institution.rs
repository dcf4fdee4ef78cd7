//! Institution domain types.

use serde::{Deserialize, Serialize};

/// Kind of charity organization.
///
/// Wire format: snake_case string (`foundation`, `ngo`, `local_collection`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionType {
    Foundation,
    Ngo,
    LocalCollection,
}

impl InstitutionType {
    pub const ALL: [Self; 3] = [Self::Foundation, Self::Ngo, Self::LocalCollection];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Foundation => "foundation",
            Self::Ngo => "ngo",
            Self::LocalCollection => "local_collection",
        }
    }

    /// Parse the stored column value. Returns `None` for unknown values.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "foundation" => Some(Self::Foundation),
            "ngo" => Some(Self::Ngo),
            "local_collection" => Some(Self::LocalCollection),
            _ => None,
        }
    }

    /// Human-readable label used in listings and exports.
    pub fn label(self) -> &'static str {
        match self {
            Self::Foundation => "Foundation",
            Self::Ngo => "Non-governmental organization",
            Self::LocalCollection => "Local collection",
        }
    }
}
