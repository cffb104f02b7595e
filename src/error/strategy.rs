//! Strategy construction errors

use super::MinerError;

/// Creates a missing strategy type error
pub fn missing_type(name: impl Into<String>) -> MinerError {
    MinerError::MissingStrategyType { name: name.into() }
}

/// Creates an unknown strategy type error
pub fn unknown_type(name: impl Into<String>, kind: impl Into<String>) -> MinerError {
    MinerError::UnknownStrategyType {
        name: name.into(),
        kind: kind.into(),
    }
}

/// Creates a missing required keyword error
pub fn missing_key(
    name: impl Into<String>,
    kind: impl Into<String>,
    key: impl Into<String>,
) -> MinerError {
    MinerError::MissingKey {
        name: name.into(),
        kind: kind.into(),
        key: key.into(),
    }
}

/// Creates an invalid option value error
pub fn invalid_option(
    name: impl Into<String>,
    kind: impl Into<String>,
    key: impl Into<String>,
    value: impl Into<String>,
) -> MinerError {
    MinerError::InvalidOption {
        name: name.into(),
        kind: kind.into(),
        key: key.into(),
        value: value.into(),
    }
}

/// Creates an aggregated invalid operations error
pub fn invalid_operations(name: impl Into<String>, problems: &[String]) -> MinerError {
    MinerError::InvalidOperations {
        name: name.into(),
        problems: problems.join("; "),
    }
}

/// Creates an invalid sort order error
pub fn invalid_sort_order(name: impl Into<String>, order: impl Into<String>) -> MinerError {
    MinerError::InvalidSortOrder {
        name: name.into(),
        order: order.into(),
    }
}

/// Creates an empty sidebar error
pub fn empty_sidebar(name: impl Into<String>, kind: impl Into<String>) -> MinerError {
    MinerError::EmptySidebar {
        name: name.into(),
        kind: kind.into(),
    }
}

/// Creates an invalid ranking constraint error
pub fn invalid_constraint(key: impl Into<String>, reason: impl Into<String>) -> MinerError {
    MinerError::InvalidConstraint {
        key: key.into(),
        reason: reason.into(),
    }
}
