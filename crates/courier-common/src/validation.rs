//! Input validation utilities.
//!
//! Centralized validation helpers used across API routes.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use validator::Validate;

use crate::error::CourierError;

/// Validate a request body, returning a CourierError::Validation on failure.
pub fn validate_request<T: Validate>(body: &T) -> Result<(), CourierError> {
    body.validate().map_err(|e| CourierError::Validation {
        message: format_validation_errors(e),
    })
}

/// Format validation errors into a human-readable string.
fn format_validation_errors(errors: validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for '{field}'"))
            })
        })
        .collect();
    // HashMap iteration order is unstable; keep responses deterministic.
    messages.sort();
    messages.join("; ")
}

/// Validate that an envelope field is standard base64 and within `max_len` characters.
pub fn validate_base64_field(value: &str, field: &str, max_len: usize) -> Result<(), CourierError> {
    if value.len() > max_len {
        return Err(CourierError::Validation {
            message: format!("{field} exceeds {max_len} bytes"),
        });
    }
    B64.decode(value).map_err(|_| CourierError::Validation {
        message: format!("{field} is not valid base64"),
    })?;
    Ok(())
}
