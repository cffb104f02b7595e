//! Expression errors

use super::MinerError;

/// Creates an equation parse error
pub fn parse_failed(equation: impl Into<String>, reason: impl Into<String>) -> MinerError {
    MinerError::ExpressionParseFailed {
        equation: equation.into(),
        reason: reason.into(),
    }
}

/// Creates an unresolved variable error
pub fn unresolved_variable(variable: impl Into<String>, equation: impl Into<String>) -> MinerError {
    MinerError::UnresolvedVariable {
        variable: variable.into(),
        equation: equation.into(),
    }
}

/// Creates a non-numeric variable error
pub fn non_numeric_variable(
    variable: impl Into<String>,
    value: impl Into<String>,
    equation: impl Into<String>,
) -> MinerError {
    MinerError::NonNumericVariable {
        variable: variable.into(),
        value: value.into(),
        equation: equation.into(),
    }
}
