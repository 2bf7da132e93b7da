use crate::auth::ResponseClass;
use crate::domain::DomainError;
use serde_json::Value;

/// Extract the human-readable message from an error body.
///
/// The service reports failures as `{"detail": ...}` where `detail` is either
/// a string or a list of field errors each carrying a `msg`.
pub fn remote_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?;

    match detail {
        Value::String(msg) if !msg.trim().is_empty() => Some(msg.trim().to_string()),
        Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(Value::as_array)
                        .and_then(|loc| loc.last())
                        .and_then(Value::as_str);
                    Some(match field {
                        Some(field) => format!("{}: {}", field, msg),
                        None => msg.to_string(),
                    })
                })
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join(", "))
            }
        }
        _ => None,
    }
}

/// Map a non-success response class and its body to a domain error
pub fn status_error(class: ResponseClass, body: &str) -> DomainError {
    let message = remote_message(body).unwrap_or_default();
    match class {
        ResponseClass::Unauthorized => DomainError::Unauthorized(if message.is_empty() {
            "credential missing or expired".to_string()
        } else {
            message
        }),
        ResponseClass::Forbidden => DomainError::PermissionDenied(message),
        ResponseClass::Other(404) => DomainError::NotFound(message),
        ResponseClass::Other(status) => DomainError::ServiceError { status, message },
        // Callers only map failures; a success class here means a bug upstream
        ResponseClass::Ok => DomainError::ServiceError {
            status: 200,
            message,
        },
    }
}
