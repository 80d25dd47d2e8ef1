//! CLI error type.

use std::fmt;

use kraftload::config::ConfigError;
use kraftload::logging::LogError;
use kraftload::manager::ManagerError;
use kraftload::version::ParseError;

/// Anything that makes a command exit with status 1.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded or is inconsistent.
    Config(String),
    /// Logging could not be set up.
    Logging(LogError),
    /// A version argument did not parse.
    InvalidVersion(ParseError),
    /// A lifecycle operation failed.
    Manager(ManagerError),
    /// Output could not be rendered.
    Output(String),
}

impl CliError {
    /// Short machine-readable name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Logging(_) => "logging",
            Self::InvalidVersion(_) => "invalid_version",
            Self::Manager(e) => e.kind(),
            Self::Output(_) => "output",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::Logging(e) => write!(f, "Logging error: {}", e),
            Self::InvalidVersion(e) => write!(f, "{}", e),
            Self::Manager(e) => write!(f, "{}", e),
            Self::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Logging(e) => Some(e),
            Self::InvalidVersion(e) => Some(e),
            Self::Manager(e) => Some(e),
            Self::Config(_) | Self::Output(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<LogError> for CliError {
    fn from(e: LogError) -> Self {
        Self::Logging(e)
    }
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        Self::InvalidVersion(e)
    }
}

impl From<ManagerError> for CliError {
    fn from(e: ManagerError) -> Self {
        Self::Manager(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Output(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_errors_keep_their_kind() {
        let err = CliError::from(ManagerError::NothingToRollback);
        assert_eq!(err.kind(), "nothing_to_rollback");
        assert_eq!(
            err.to_string(),
            "nothing to roll back to: no previous version installed"
        );
    }

    #[test]
    fn test_config_error_message() {
        let err = CliError::Config("bad bucket".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad bucket");
    }
}
