use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Day, OverrideKind, SlotStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub faculty_id: String,
    #[serde(skip)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lab {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// One recurring (lab, day, period) cell of the weekly template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateSlot {
    pub id: i64,
    pub lab_id: i64,
    pub day: Day,
    pub period: u8,
    pub status: SlotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_info: Option<String>,
}

/// A one-off reservation of a free slot on a concrete date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub slot_id: i64,
    pub date: NaiveDate,
    pub faculty_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_info: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Whether a weekend default applies to one lab or to every lab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultScope {
    Lab(i64),
    Global,
}

impl DefaultScope {
    #[must_use]
    pub const fn lab_id(self) -> Option<i64> {
        match self {
            DefaultScope::Lab(id) => Some(id),
            DefaultScope::Global => None,
        }
    }

    /// Lookup keys for a lab, most specific first.
    #[must_use]
    pub const fn fallback_chain(lab_id: i64) -> [DefaultScope; 2] {
        [DefaultScope::Lab(lab_id), DefaultScope::Global]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekendDefault {
    pub id: i64,
    /// `None` for the global row.
    pub lab_id: Option<i64>,
    pub day: Day,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl WeekendDefault {
    /// The blocking text, if this default marks the day as Regular.
    #[must_use]
    pub fn blocking_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeekendOverride {
    pub id: i64,
    pub lab_id: i64,
    pub day: Day,
    pub target_date: NaiveDate,
    pub kind: OverrideKind,
    pub source_day: Day,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    #[serde(skip)]
    pub token_hash: String,
    #[serde(skip)]
    pub token_lookup: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}
