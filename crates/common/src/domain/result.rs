use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

const GENERIC_FAILURE: &str = "The request could not be completed. Please try again.";
const ADMINISTRATORS_ONLY: &str =
    "Permission denied. Only Administrators are allowed to perform this action.";

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service error ({status}): {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Cannot {action} while workflow is {state}")]
    InvalidTransition { state: String, action: String },

    #[error("Another operation is still in progress")]
    WorkflowBusy,

    #[error("Inventory data is unavailable: {0}")]
    SnapshotUnavailable(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

impl DomainError {
    /// Message shown to the operator for a failed action.
    ///
    /// Remote-supplied text is used when the service sent one; otherwise a
    /// generic description is returned.
    pub fn user_message(&self) -> String {
        match self {
            DomainError::ValidationError(msg) => msg.clone(),
            DomainError::NetworkError(_) => {
                "Unable to reach the inventory service. Check your connection and try again."
                    .to_string()
            }
            DomainError::Unauthorized(_) => "Your session has expired. Please sign in again.".to_string(),
            DomainError::PermissionDenied(detail) if detail.is_empty() => {
                ADMINISTRATORS_ONLY.to_string()
            }
            DomainError::PermissionDenied(detail) => format!("{} ({})", ADMINISTRATORS_ONLY, detail),
            DomainError::NotFound(detail) if detail.is_empty() => {
                "The device no longer exists. Refresh the list and try again.".to_string()
            }
            DomainError::NotFound(detail) => detail.clone(),
            DomainError::ServiceError { message, .. } if message.is_empty() => {
                GENERIC_FAILURE.to_string()
            }
            DomainError::ServiceError { message, .. } => message.clone(),
            DomainError::InvalidCredentials => {
                "Invalid email or password. Please try again.".to_string()
            }
            DomainError::InvalidTransition { .. } | DomainError::WorkflowBusy => {
                "Another device operation is already in progress.".to_string()
            }
            DomainError::SnapshotUnavailable(_) => {
                "Inventory data is unavailable. Refresh and try again.".to_string()
            }
            DomainError::RepositoryError(_) => GENERIC_FAILURE.to_string(),
        }
    }

    /// Whether this failure ends the current session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DomainError::Unauthorized(_))
    }
}
