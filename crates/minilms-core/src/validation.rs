//! Input validation for entity writes
//!
//! Each check returns a [`ValidationError`] whose `code` names the rule that
//! failed. [`to_lms_error`] turns a failed check into the error the services
//! raise.

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveTime};
use validator::ValidationError;

use minilms_common::{ConflictReason, LmsError, is_valid_day_of_week};

/// Maximum length for name-like fields
pub const MAX_NAME_LENGTH: usize = 255;

/// Maximum length for a phone number
pub const MAX_PHONE_LENGTH: usize = 20;

/// Accepted values of `student.gender`
pub const GENDERS: [&str; 3] = ["Male", "Female", "Other"];

const TIME_RANGE_CODE: &str = "time_range_invalid";

fn error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Validate a required display field (name, subject, teacher, package)
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(error("name_empty", format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_NAME_LENGTH {
        return Err(error(
            "name_too_long",
            format!("{} must be at most {} characters", field, MAX_NAME_LENGTH),
        ));
    }
    Ok(())
}

/// Validate a phone number: digits with an optional leading `+`, spaces and dashes
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(error("phone_empty", "phone must not be empty"));
    }
    if phone.len() > MAX_PHONE_LENGTH {
        return Err(error("phone_too_long", "phone is too long"));
    }

    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if !digits
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err(error("phone_invalid_chars", "phone may only contain digits"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(error("email_invalid", format!("'{}' is not an email", email))),
    }
}

pub fn validate_gender(gender: &str) -> Result<(), ValidationError> {
    if GENDERS.contains(&gender) {
        Ok(())
    } else {
        Err(error(
            "gender_invalid",
            format!("gender must be one of {}", GENDERS.join(", ")),
        ))
    }
}

pub fn validate_day_of_week(day: i32) -> Result<(), ValidationError> {
    if is_valid_day_of_week(day) {
        Ok(())
    } else {
        Err(error(
            "day_of_week_out_of_range",
            "day_of_week must be between 0 (Sunday) and 6 (Saturday)",
        ))
    }
}

pub fn validate_time_range(start: NaiveTime, end: NaiveTime) -> Result<(), ValidationError> {
    if start < end {
        Ok(())
    } else {
        Err(error(TIME_RANGE_CODE, "time_start must be before time_end"))
    }
}

pub fn validate_max_students(max_students: i32) -> Result<(), ValidationError> {
    if max_students >= 1 {
        Ok(())
    } else {
        Err(error("max_students_invalid", "max_students must be at least 1"))
    }
}

/// Session counters of a subscription: `total >= 1` and `0 <= used <= total`
pub fn validate_sessions(total: i32, used: i32) -> Result<(), ValidationError> {
    if total < 1 {
        return Err(error("total_sessions_invalid", "total_sessions must be at least 1"));
    }
    if used < 0 || used > total {
        return Err(error(
            "used_sessions_out_of_range",
            "used_sessions cannot exceed total_sessions",
        ));
    }
    Ok(())
}

pub fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ValidationError> {
    if start <= end {
        Ok(())
    } else {
        Err(error("date_range_invalid", "start_date must not be after end_date"))
    }
}

/// Map a failed check to the service error
///
/// An inverted class time range is a conflict of its own; every other rule
/// reports an illegal argument carrying the rule's message.
pub fn to_lms_error(err: ValidationError) -> LmsError {
    if err.code == TIME_RANGE_CODE {
        return ConflictReason::InvalidTimeRange.into();
    }

    let message = err
        .message
        .map(|m| m.into_owned())
        .unwrap_or_else(|| err.code.into_owned());
    LmsError::IllegalArgument(message)
}

/// Run a check, raising the service error on failure
pub fn check(result: Result<(), ValidationError>) -> Result<(), LmsError> {
    result.map_err(to_lms_error)
}
