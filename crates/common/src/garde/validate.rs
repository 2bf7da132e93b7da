//! Garde validation utilities.

use crate::domain::DomainError;
use ::garde::{Report, Validate};
use std::net::Ipv4Addr;

/// Validate a struct, converting the garde report into a `DomainError`
pub fn validate<T>(value: &T) -> Result<(), DomainError>
where
    T: Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| DomainError::ValidationError(format_validation_errors(&report)))
}

/// Format validation errors from garde Report into a human-readable string
fn format_validation_errors(report: &Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            if path.to_string().is_empty() {
                error.message().to_string()
            } else {
                format!("{}: {}", path, error.message())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rejects empty and whitespace-only strings
pub fn not_blank(value: &str, _ctx: &()) -> ::garde::Result {
    if value.trim().is_empty() {
        return Err(::garde::Error::new("is required"));
    }
    Ok(())
}

/// Accepts dotted-quad IPv4 addresses only
pub fn ipv4_address(value: &str, _ctx: &()) -> ::garde::Result {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(::garde::Error::new("is required"));
    }
    trimmed
        .parse::<Ipv4Addr>()
        .map(|_| ())
        .map_err(|_| ::garde::Error::new("is not a valid IPv4 address"))
}
