//! Validation helpers for submitted form values.
//!
//! These routines check a candidate value against the field settings attached
//! to a parameter before the action is executed:
//! - Required fields reject null and blank text.
//! - Number inputs accept JSON numbers or numeric text.
//! - Date and datetime inputs accept ISO-8601 text.
//! - Other input types accept any present value.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::{FieldSettings, FieldType, InputType};

/// Validate a JSON candidate against the field's settings.
///
/// `None` means the submission carried no value for the field.
pub fn validate_field_value(candidate: Option<&Value>, settings: &FieldSettings) -> Result<(), String> {
    let present = candidate.filter(|value| !is_blank(value));
    let Some(value) = present else {
        return if settings.required {
            Err("value is required".to_string())
        } else {
            Ok(())
        };
    };

    match (settings.input_type, settings.field_type) {
        (InputType::Number, _) | (_, FieldType::Number) => validate_number(value),
        (InputType::Date, _) => validate_date(value),
        (InputType::DateTime, _) => validate_datetime(value),
        _ => Ok(()),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

fn validate_number(value: &Value) -> Result<(), String> {
    match value {
        Value::Number(_) => Ok(()),
        Value::String(text) if text.trim().parse::<f64>().is_ok() => Ok(()),
        _ => Err("value must be a number".to_string()),
    }
}

fn validate_date(value: &Value) -> Result<(), String> {
    let text = value.as_str().ok_or_else(|| "value must be a date in YYYY-MM-DD format".to_string())?;
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|error| format!("value must be a date in YYYY-MM-DD format: {}", error))
}

fn validate_datetime(value: &Value) -> Result<(), String> {
    let text = value
        .as_str()
        .map(str::trim)
        .ok_or_else(|| "value must be an ISO-8601 datetime".to_string())?;
    if DateTime::parse_from_rfc3339(text).is_ok() || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").is_ok() {
        Ok(())
    } else {
        Err("value must be an ISO-8601 datetime".to_string())
    }
}
