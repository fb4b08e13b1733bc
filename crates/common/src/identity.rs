use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's stable identifier
///
/// Assigned by the relay at registration. Before that, a device works under a
///  locally generated provisional identity, which is migrated once the relay
///  hands out the real one.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Identity(Uuid);

impl Identity {
    /// Generate a random, local-only identity
    pub fn provisional() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for Identity {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<Identity> for Uuid {
    fn from(val: Identity) -> Self {
        val.0
    }
}

impl FromStr for Identity {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s.trim())?))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // hyphenated lowercase; also what vault labels embed
        write!(f, "{}", self.0.hyphenated())
    }
}
