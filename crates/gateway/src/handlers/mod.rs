//! Request handlers

pub mod files;
pub mod health;
pub mod issues;
pub mod media;
pub mod newspapers;

use axum::Json;
use chrono::NaiveDate;
use pressroom_common::errors::{AppError, Result};
use serde::Serialize;

/// Standard `{success, data}` envelope for API responses
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
    Json(Envelope {
        success: true,
        data,
    })
}

/// Unwrap an optional request field or fail with a 400
pub fn require<T>(value: Option<T>, field: &str) -> Result<T> {
    value.ok_or_else(|| AppError::MissingField {
        field: field.to_string(),
    })
}

/// Parse an ISO `yyyy-mm-dd` date or fail with a 400
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    input.parse().map_err(|_| AppError::Validation {
        message: format!("Invalid date: {}", input),
        field: Some("date".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_missing_field() {
        let err = require::<String>(None, "newspaper").unwrap_err();
        assert!(matches!(err, AppError::MissingField { field } if field == "newspaper"));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert!(parse_date("01-05-2024").is_err());
        assert!(parse_date("not-a-date").is_err());
    }
}
