use thiserror::Error;

/// Errors raised by the monitoring core.
///
/// The application layer wraps these in [`anyhow::Error`] with context,
/// but they stay distinguishable through `downcast_ref`.
#[derive(Debug, Error, PartialEq)]
pub enum MonitorError {
    #[error("invalid input: {message} (at {location})")]
    Input { message: String, location: String },

    #[error("series is empty")]
    EmptySeries,

    #[error("standard deviation needs at least 2 values, but got {n_vals}")]
    InsufficientData { n_vals: usize },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

impl MonitorError {
    pub fn input(message: impl Into<String>, location: impl Into<String>) -> Self {
        MonitorError::Input {
            message: message.into(),
            location: location.into(),
        }
    }

    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        MonitorError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

pub type MonitorResult<T> = std::result::Result<T, MonitorError>;
