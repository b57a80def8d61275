use thiserror::Error;
use tracing::error;

use crate::domain::models::slot::SlotLabel;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Personnel code must be {min} to {max} letters or digits")]
    InvalidStaffCode { min: usize, max: usize },
    #[error("{field} must be between {min} and {max} characters")]
    NameLength { field: &'static str, min: usize, max: usize },
    #[error("Number of guests must be between 0 and {max} (got {got})")]
    PartySizeOutOfRange { got: u32, max: u32 },
    #[error("Please choose an arrival time")]
    NoSlotChosen,
    #[error("Arrival time {0} does not exist")]
    UnknownSlot(SlotLabel),
    #[error("Arrival time {0} is no longer available")]
    SlotUnavailable(SlotLabel),
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),
    #[error("Capacity conflict: {0}")]
    CapacityConflict(String),
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Remote API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Malformed payload: {0}")]
    Decode(String),
    #[error("Invalid slot label: {0:?}")]
    InvalidSlotLabel(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Request cancelled")]
    Cancelled,
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl AppError {
    pub fn validation(error: ValidationError) -> Self {
        AppError::Validation(vec![error])
    }

    /// The text shown to the user. Remote failures collapse into a generic
    /// connectivity message; details only go to the log.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(errors) => join_messages(errors),
            AppError::CapacityConflict(msg) => {
                if msg.is_empty() {
                    "This arrival time has just filled up, please choose another one".to_string()
                } else {
                    msg.clone()
                }
            }
            AppError::Transport(e) => {
                error!("Transport error: {:?}", e);
                "Unable to reach the registration service, please try again".to_string()
            }
            AppError::Api { status, message } => {
                error!("Remote API error {}: {}", status, message);
                "Unable to reach the registration service, please try again".to_string()
            }
            AppError::Rejected(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Unauthorized => "Your session has expired, please sign in again".to_string(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::Decode(msg) => {
                error!("Malformed payload: {}", msg);
                "Unexpected response from the registration service".to_string()
            }
            AppError::InvalidSlotLabel(label) => format!("Invalid arrival time: {}", label),
            AppError::Config(msg) => msg.clone(),
            AppError::Cancelled => "Request cancelled".to_string(),
        }
    }

    /// Whether the caller must re-fetch the slot board before the user retries.
    pub fn requires_refresh(&self) -> bool {
        matches!(self, AppError::CapacityConflict(_))
    }

    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            AppError::Validation(errors) => errors,
            _ => &[],
        }
    }
}
