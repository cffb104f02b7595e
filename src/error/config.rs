//! Configuration errors

use super::MinerError;

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> MinerError {
    MinerError::ConfigNotFound { path: path.into() }
}

/// Creates a config parse failed error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> MinerError {
    MinerError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid config error
pub fn invalid(message: impl Into<String>) -> MinerError {
    MinerError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates a missing required parameters error listing every missing name
pub fn missing_parameters(names: &[String]) -> MinerError {
    MinerError::MissingParameters {
        names: names.join(", "),
    }
}

/// Creates an ill-formed parameters string error
pub fn invalid_parameters(input: impl Into<String>, reason: impl Into<String>) -> MinerError {
    MinerError::InvalidParameters {
        input: input.into(),
        reason: reason.into(),
    }
}
