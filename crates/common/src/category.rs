use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named partition of records held by the relay
///
/// Each category carries a fixed capability table instead of per-call special
///  cases: whether clients may query it, whether clients may push data into it,
///  and the path segment the relay knows it by.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SharedItemCategory {
    /// Friend discovery requests, filled only by the handshake endpoint
    Handshake,
    /// Encrypted location payloads
    Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryCapabilities {
    pub queryable: bool,
    pub updatable: bool,
    pub path: &'static str,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl SharedItemCategory {
    pub const ALL: [SharedItemCategory; 2] =
        [SharedItemCategory::Handshake, SharedItemCategory::Location];

    pub const fn capabilities(&self) -> CategoryCapabilities {
        match self {
            SharedItemCategory::Handshake => CategoryCapabilities {
                queryable: true,
                updatable: false,
                path: "handshake",
            },
            SharedItemCategory::Location => CategoryCapabilities {
                queryable: true,
                updatable: true,
                path: "location",
            },
        }
    }

    pub const fn is_queryable(&self) -> bool {
        self.capabilities().queryable
    }

    /// Whether clients may push payloads with `update`
    pub const fn is_updatable(&self) -> bool {
        self.capabilities().updatable
    }

    pub const fn as_str(&self) -> &'static str {
        self.capabilities().path
    }
}

impl fmt::Display for SharedItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SharedItemCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
