use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotFound,
    Validation,
    Upstream,
}

/// Startup-time failures. Any of these aborts the process before it serves.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    MissingSetting(&'static str),
    #[error("invalid value for `{name}`: {message}")]
    InvalidSetting { name: &'static str, message: String },
    #[error("signal name list is empty")]
    EmptySignalList,
}

/// Request-scoped failures from an activation. None of them mutate the
/// selection index.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("signal name must not be empty")]
    EmptySignalName,
    #[error("signal `{0}` is not in the configured sequence")]
    UnknownSignal(String),
    #[error("appliance `{0}` not found")]
    ApplianceNotFound(String),
    #[error("signal `{signal}` not found on appliance `{appliance}`")]
    SignalNotFound { appliance: String, signal: String },
    #[error("failed to list appliances: {0:#}")]
    Directory(anyhow::Error),
    #[error("failed to send signal `{signal}`: {cause:#}")]
    Transmission { signal: String, cause: anyhow::Error },
}

impl ControllerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::EmptySignalName => ErrorCode::Validation,
            Self::UnknownSignal(_) | Self::ApplianceNotFound(_) | Self::SignalNotFound { .. } => {
                ErrorCode::NotFound
            }
            Self::Directory(_) | Self::Transmission { .. } => ErrorCode::Upstream,
        }
    }
}
