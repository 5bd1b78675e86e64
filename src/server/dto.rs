use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timetable::SlotView;
use crate::types::{Lab, TemplateSlot, User};

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub faculty_id: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub faculty_id: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LabNameRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimetableResponse {
    pub lab: Lab,
    /// First day of the window, which is always today.
    pub week_start: NaiveDate,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingRequest {
    pub slot_id: i64,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_info: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReleaseRequest {
    pub slot_id: i64,
    pub date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlotStatusRequest {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_info: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlotStatusResponse {
    pub slot: TemplateSlot,
    /// Bookings deleted because the slot became Regular.
    pub evicted_bookings: usize,
}

/// A lab id, or the string `"global"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabTarget {
    Lab(i64),
    Named(String),
}

/// `lab_id` absent, null or `"global"` means the global default.
#[derive(Debug, Serialize, Deserialize)]
pub struct WeekendDefaultRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<LabTarget>,
    pub day: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// `source_day` absent clears the override.
#[derive(Debug, Serialize, Deserialize)]
pub struct WeekendOverrideRequest {
    pub lab_id: i64,
    pub day: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_day: Option<String>,
}
