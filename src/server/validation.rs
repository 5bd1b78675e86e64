use chrono::NaiveDate;

use crate::server::dto::LabTarget;
use crate::server::response::ApiError;
use crate::types::{Day, DefaultScope, SlotStatus};

const MAX_LAB_NAME_LEN: usize = 64;
const MAX_USER_NAME_LEN: usize = 100;
const MAX_FACULTY_ID_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_CLASS_INFO_LEN: usize = 200;

fn validate_text(value: &str, entity: &str, max_len: usize) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{entity} cannot be empty"));
    }
    if value.chars().count() > max_len {
        return Err(format!("{entity} cannot exceed {max_len} characters"));
    }
    Ok(())
}

pub fn validate_lab_name(name: &str) -> Result<(), ApiError> {
    validate_text(name, "Lab name", MAX_LAB_NAME_LEN).map_err(ApiError::bad_request)
}

pub fn validate_user_name(name: &str) -> Result<(), ApiError> {
    validate_text(name, "Name", MAX_USER_NAME_LEN).map_err(ApiError::bad_request)
}

pub fn validate_faculty_id(faculty_id: &str) -> Result<(), ApiError> {
    validate_text(faculty_id, "Faculty id", MAX_FACULTY_ID_LEN).map_err(ApiError::bad_request)?;
    if faculty_id.contains(char::is_whitespace) {
        return Err(ApiError::bad_request("Faculty id cannot contain whitespace"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_class_info(class_info: Option<&str>) -> Result<(), ApiError> {
    match class_info {
        Some(text) if text.chars().count() > MAX_CLASS_INFO_LEN => Err(ApiError::bad_request(
            format!("Class info cannot exceed {MAX_CLASS_INFO_LEN} characters"),
        )),
        _ => Ok(()),
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request(format!("Invalid date '{value}', expected YYYY-MM-DD")))
}

pub fn parse_day(value: &str) -> Result<Day, ApiError> {
    Day::parse(value).ok_or_else(|| ApiError::bad_request(format!("Invalid day '{value}'")))
}

pub fn parse_weekend_day(value: &str) -> Result<Day, ApiError> {
    let day = parse_day(value)?;
    if !day.is_weekend() {
        return Err(ApiError::bad_request(format!(
            "'{value}' is not Saturday or Sunday"
        )));
    }
    Ok(day)
}

pub fn parse_scope(target: Option<&LabTarget>) -> Result<DefaultScope, ApiError> {
    match target {
        None => Ok(DefaultScope::Global),
        Some(LabTarget::Lab(id)) => Ok(DefaultScope::Lab(*id)),
        Some(LabTarget::Named(name)) if name.eq_ignore_ascii_case("global") => {
            Ok(DefaultScope::Global)
        }
        Some(LabTarget::Named(name)) => Err(ApiError::bad_request(format!(
            "Invalid lab_id '{name}', expected a lab id or 'global'"
        ))),
    }
}

pub fn parse_status(value: &str) -> Result<SlotStatus, ApiError> {
    SlotStatus::parse(value).ok_or_else(|| {
        ApiError::bad_request(format!(
            "Invalid status '{value}', expected Free or Regular"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2026-10-21").unwrap(),
            NaiveDate::from_ymd_opt(2026, 10, 21).unwrap()
        );
        assert!(parse_date("21/10/2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_days() {
        assert_eq!(parse_day("Wednesday").unwrap(), Day::Wednesday);
        assert!(parse_day("Funday").is_err());
        assert_eq!(parse_weekend_day("Sunday").unwrap(), Day::Sunday);
        assert!(parse_weekend_day("Monday").is_err());
    }

    #[test]
    fn test_parse_scope() {
        assert_eq!(parse_scope(None).unwrap(), DefaultScope::Global);
        assert_eq!(
            parse_scope(Some(&LabTarget::Lab(3))).unwrap(),
            DefaultScope::Lab(3)
        );
        assert_eq!(
            parse_scope(Some(&LabTarget::Named("global".into()))).unwrap(),
            DefaultScope::Global
        );
        assert!(parse_scope(Some(&LabTarget::Named("lab3".into()))).is_err());

        let target: LabTarget = serde_json::from_str("\"global\"").unwrap();
        assert_eq!(target, LabTarget::Named("global".into()));
        let target: LabTarget = serde_json::from_str("7").unwrap();
        assert_eq!(target, LabTarget::Lab(7));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("Regular").unwrap(), SlotStatus::Regular);
        assert_eq!(parse_status("Free").unwrap(), SlotStatus::Free);
        assert!(parse_status("Booked").is_err());
    }

    #[test]
    fn test_names() {
        assert!(validate_lab_name("Lab 1").is_ok());
        assert!(validate_lab_name("   ").is_err());
        assert!(validate_lab_name(&"x".repeat(65)).is_err());
        assert!(validate_faculty_id("f7").is_ok());
        assert!(validate_faculty_id("f 7").is_err());
        assert!(validate_password("short").is_err());
        assert!(validate_password("longer-secret").is_ok());
        assert!(validate_class_info(None).is_ok());
        assert!(validate_class_info(Some(&"y".repeat(201))).is_err());
    }
}
