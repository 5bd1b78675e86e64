use std::fmt;

use serde::{Deserialize, Serialize};

/// Stored status of a template slot. Only admins change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlotStatus {
    #[default]
    Free,
    Regular,
}

impl SlotStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SlotStatus::Free => "Free",
            SlotStatus::Regular => "Regular",
        }
    }

    pub fn parse(s: &str) -> Option<SlotStatus> {
        match s {
            "Free" => Some(SlotStatus::Free),
            "Regular" => Some(SlotStatus::Regular),
            _ => None,
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status shown to viewers once bookings and weekend rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectiveStatus {
    Free,
    Regular,
    Booked,
}

impl From<SlotStatus> for EffectiveStatus {
    fn from(s: SlotStatus) -> Self {
        match s {
            SlotStatus::Free => EffectiveStatus::Free,
            SlotStatus::Regular => EffectiveStatus::Regular,
        }
    }
}

impl fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EffectiveStatus::Free => "Free",
            EffectiveStatus::Regular => "Regular",
            EffectiveStatus::Booked => "Booked",
        })
    }
}

/// How a weekend override reshapes its target date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideKind {
    /// Mirror the template of a named weekday.
    #[default]
    Follow,
}

impl OverrideKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OverrideKind::Follow => "follow",
        }
    }

    pub fn parse(s: &str) -> Option<OverrideKind> {
        match s {
            "follow" => Some(OverrideKind::Follow),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot_status() {
        assert_eq!(SlotStatus::parse("Regular"), Some(SlotStatus::Regular));
        assert_eq!(SlotStatus::parse("Free"), Some(SlotStatus::Free));
        assert_eq!(SlotStatus::parse("Booked"), None);
    }

    #[test]
    fn test_override_kind_wire_name() {
        assert_eq!(serde_json::to_string(&OverrideKind::Follow).unwrap(), "\"follow\"");
        assert_eq!(OverrideKind::parse("follow"), Some(OverrideKind::Follow));
        assert_eq!(OverrideKind::parse("mirror"), None);
    }
}
