//! Geometry errors

use super::MinerError;

/// Creates a geometry parse error
pub fn parse_failed(reason: impl Into<String>) -> MinerError {
    MinerError::GeometryParseFailed {
        reason: reason.into(),
    }
}

/// Creates a geometry import error for one resource
pub fn import_failed(identity: impl Into<String>, reason: impl Into<String>) -> MinerError {
    MinerError::GeometryImportFailed {
        identity: identity.into(),
        reason: reason.into(),
    }
}
