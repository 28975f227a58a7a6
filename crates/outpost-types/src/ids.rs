//! Type-safe identifier wrappers.
//!
//! Sessions are identified by UUID v7 (time-ordered) so exported event
//! logs sort naturally. Hazard centers carry the small positive integer
//! authored in the map source.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Identifier of a hazard center, as authored in the map source.
///
/// Authored ids are strictly positive; `0` in a map row means "no hazard".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct HazardId(pub u32);

impl HazardId {
    /// Build a hazard id from an authored value, returning `None` for `0`.
    pub const fn from_authored(raw: u32) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    /// Return the raw authored value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for HazardId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one run of the experiment (all sessions of one
/// participant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_hazard() {
        assert_eq!(HazardId::from_authored(0), None);
        assert_eq!(HazardId::from_authored(7), Some(HazardId(7)));
    }

    #[test]
    fn session_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn hazard_id_serializes_as_number() {
        let json = serde_json::to_string(&HazardId(7)).ok();
        assert_eq!(json.as_deref(), Some("7"));
    }
}
