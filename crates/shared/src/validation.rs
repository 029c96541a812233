//! Common validation utilities.

use chrono::NaiveDate;
use validator::ValidationError;

lazy_static::lazy_static! {
    /// College register numbers: 6-12 alphanumeric characters, upper case.
    static ref REGISTER_NUMBER_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z0-9]{6,12}$").unwrap();

    /// Staff IDs: department prefix plus numeric suffix, e.g. CSE042.
    static ref STAFF_ID_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z]{2,5}[0-9]{2,6}$").unwrap();
}

/// Validates a student register number.
pub fn validate_register_number(value: &str) -> Result<(), ValidationError> {
    if REGISTER_NUMBER_REGEX.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("register_number_format");
        err.message = Some("Register number must be 6-12 upper-case alphanumerics".into());
        Err(err)
    }
}

/// Validates a staff ID.
pub fn validate_staff_id(value: &str) -> Result<(), ValidationError> {
    if STAFF_ID_REGEX.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("staff_id_format");
        err.message = Some("Staff ID must be a department prefix followed by digits".into());
        Err(err)
    }
}

/// Validates that a semester is within the 1-10 range.
pub fn validate_semester(semester: i16) -> Result<(), ValidationError> {
    if (1..=10).contains(&semester) {
        Ok(())
    } else {
        let mut err = ValidationError::new("semester_range");
        err.message = Some("Semester must be between 1 and 10".into());
        Err(err)
    }
}

/// Validates that a date range is ordered (`to >= from`).
pub fn validate_date_range(from: NaiveDate, to: NaiveDate) -> Result<(), ValidationError> {
    if to >= from {
        Ok(())
    } else {
        let mut err = ValidationError::new("date_range_order");
        err.message = Some("toDate must not be before fromDate".into());
        Err(err)
    }
}

/// Validates that a registration window is strictly ordered (start < end).
pub fn validate_window(
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
) -> Result<(), ValidationError> {
    if start < end {
        Ok(())
    } else {
        let mut err = ValidationError::new("window_order");
        err.message = Some("Registration start must be before registration end".into());
        Err(err)
    }
}

/// MIME types accepted for uploaded attachments and supporting documents.
pub fn is_allowed_attachment_mime(mime: &str) -> bool {
    mime.starts_with("image/") || mime == "application/pdf"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_number_valid() {
        assert!(validate_register_number("21CSE042").is_ok());
        assert!(validate_register_number("963521104001").is_ok());
    }

    #[test]
    fn test_register_number_invalid() {
        assert!(validate_register_number("").is_err());
        assert!(validate_register_number("abc123").is_err());
        assert!(validate_register_number("21-CSE-042").is_err());
        assert!(validate_register_number("1234567890123").is_err());
    }

    #[test]
    fn test_staff_id() {
        assert!(validate_staff_id("CSE042").is_ok());
        assert!(validate_staff_id("IT12").is_ok());
        assert!(validate_staff_id("042CSE").is_err());
        assert!(validate_staff_id("").is_err());
    }

    #[test]
    fn test_semester_range() {
        assert!(validate_semester(1).is_ok());
        assert!(validate_semester(10).is_ok());
        assert!(validate_semester(0).is_err());
        assert!(validate_semester(11).is_err());
    }

    #[test]
    fn test_date_range_same_day_is_valid() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(validate_date_range(d, d).is_ok());
    }

    #[test]
    fn test_date_range_reversed_is_invalid() {
        let from = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let to = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert!(validate_date_range(from, to).is_err());
    }

    #[test]
    fn test_allowed_attachment_mime() {
        assert!(is_allowed_attachment_mime("image/png"));
        assert!(is_allowed_attachment_mime("image/jpeg"));
        assert!(is_allowed_attachment_mime("application/pdf"));
        assert!(!is_allowed_attachment_mime("application/zip"));
        assert!(!is_allowed_attachment_mime("text/html"));
    }
}
