//! Error types and handling for catminer
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Configuration and invocation errors
//! - [`strategy`]: Strategy construction errors
//! - [`expression`]: Equation parsing and evaluation errors
//! - [`geometry`]: Geometry parsing and import errors
//! - [`fs`]: File system errors

pub mod config;
pub mod expression;
pub mod fs;
pub mod geometry;
pub mod strategy;

pub use config::{
    invalid as config_invalid, invalid_parameters, missing_parameters,
    not_found as config_not_found, parse_failed as config_parse_failed,
};
pub use expression::{
    non_numeric_variable, parse_failed as expression_parse_failed, unresolved_variable,
};
pub use fs::{read_failed as file_read_failed, write_failed as file_write_failed};
pub use geometry::{import_failed as geometry_import_failed, parse_failed as geometry_parse_failed};
pub use strategy::{
    empty_sidebar, invalid_constraint, invalid_operations, invalid_option, invalid_sort_order,
    missing_key, missing_type, unknown_type,
};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for catminer operations
#[derive(Error, Diagnostic, Debug)]
pub enum MinerError {
    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(catminer::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(catminer::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(catminer::config::invalid))]
    ConfigInvalid { message: String },

    #[error(
        "Users of this configuration must provide the following parameter(s) but they were not found: {names}"
    )]
    #[diagnostic(
        code(catminer::config::missing_parameters),
        help("Pass them with --parameters \"@name:value\" or in a --globals file")
    )]
    MissingParameters { names: String },

    #[error("Ill-formed parameters string [{input}]: {reason}")]
    #[diagnostic(
        code(catminer::config::invalid_parameters),
        help("Parameters are written as @key:value pairs, e.g. \"@inputdir:/data@limit:10\"")
    )]
    InvalidParameters { input: String, reason: String },

    // Strategy construction errors
    #[error("Strategy Type does not exist in configuration for {name} strategy")]
    #[diagnostic(code(catminer::strategy::missing_type))]
    MissingStrategyType { name: String },

    #[error("Could not create a {name} strategy for type [{kind}]")]
    #[diagnostic(
        code(catminer::strategy::unknown_type),
        help("Run 'catminer types' to list the available strategy types")
    )]
    UnknownStrategyType { name: String, kind: String },

    #[error("{kind}::{name} requires the {key} keyword")]
    #[diagnostic(code(catminer::strategy::missing_key))]
    MissingKey {
        name: String,
        kind: String,
        key: String,
    },

    #[error("{kind}::{name} has an invalid {key} value [{value}]")]
    #[diagnostic(code(catminer::strategy::invalid_option))]
    InvalidOption {
        name: String,
        kind: String,
        key: String,
        value: String,
    },

    #[error("Invalid operations in ResourceManager::{name}: {problems}")]
    #[diagnostic(
        code(catminer::strategy::invalid_operations),
        help(
            "Valid operations: ResetDiscard, ToggleDiscard, DeleteDiscard, HasAsset::<name>, DeleteAsset::<name>"
        )
    )]
    InvalidOperations { name: String, problems: String },

    #[error("NumericalSort::{name} has an invalid sort order [{order}]")]
    #[diagnostic(
        code(catminer::strategy::invalid_sort_order),
        help("Order must be Ascending or Descending")
    )]
    InvalidSortOrder { name: String, order: String },

    #[error("{kind}::{name} has no strategies to run")]
    #[diagnostic(
        code(catminer::strategy::empty_sidebar),
        help("Provide an inline Strategies list or a StrategyConfigFile")
    )]
    EmptySidebar { name: String, kind: String },

    #[error("Criteria keyword [{key}] is invalid: {reason}")]
    #[diagnostic(code(catminer::strategy::invalid_constraint))]
    InvalidConstraint { key: String, reason: String },

    // Expression errors
    #[error("Errors parsing equation [{equation}]: {reason}")]
    #[diagnostic(code(catminer::expression::parse_failed))]
    ExpressionParseFailed { equation: String, reason: String },

    #[error("Could not find variable [{variable}] for equation [{equation}]")]
    #[diagnostic(
        code(catminer::expression::unresolved_variable),
        help("Add the keyword to the resources or seed it with an Initializers entry")
    )]
    UnresolvedVariable { variable: String, equation: String },

    #[error("Variable [{variable}] value [{value}] is not numeric in equation [{equation}]")]
    #[diagnostic(code(catminer::expression::non_numeric_variable))]
    NonNumericVariable {
        variable: String,
        value: String,
        equation: String,
    },

    // Geometry errors
    #[error("Failed to parse geometry: {reason}")]
    #[diagnostic(code(catminer::geometry::parse_failed))]
    GeometryParseFailed { reason: String },

    #[error("{identity} failed to construct geometry: {reason}")]
    #[diagnostic(code(catminer::geometry::import_failed))]
    GeometryImportFailed { identity: String, reason: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(catminer::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(catminer::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(catminer::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for MinerError {
    fn from(err: std::io::Error) -> Self {
        MinerError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for MinerError {
    fn from(err: serde_yaml::Error) -> Self {
        MinerError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MinerError {
    fn from(err: serde_json::Error) -> Self {
        MinerError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, MinerError>;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_error_contains {
        ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
            #[test]
            fn $test_name() {
                let err = $err;
                let error_string = err.to_string();
                $(
                    assert!(error_string.contains($contains),
                        "Error message should contain '{}', got: {}",
                        $contains,
                        error_string
                    );
                )+
            }
        };
    }

    #[test]
    fn test_error_display() {
        let err = MinerError::UnknownStrategyType {
            name: "Reader".to_string(),
            kind: "Bogus".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Could not create a Reader strategy for type [Bogus]"
        );
    }

    #[test]
    fn test_error_code() {
        let err = MinerError::InvalidSortOrder {
            name: "Sort".to_string(),
            order: "Sideways".to_string(),
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("catminer::strategy::invalid_sort_order".to_string())
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MinerError = io_err.into();
        assert!(matches!(err, MinerError::IoError { .. }));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: yaml: content: [unclosed";
        let parse_result: std::result::Result<serde_yaml::Value, _> =
            serde_yaml::from_str(yaml_str);
        let yaml_err = parse_result.unwrap_err();
        let err: MinerError = yaml_err.into();
        assert!(matches!(err, MinerError::ConfigParseFailed { .. }));
    }

    test_error_contains!(
        test_sort_order_names_value,
        invalid_sort_order("ByRank", "Sideways"),
        "Sideways",
        "ByRank"
    );

    test_error_contains!(
        test_missing_parameters_lists_all,
        missing_parameters(&["inputdir".to_string(), "outputdir".to_string()]),
        "inputdir, outputdir"
    );

    test_error_contains!(
        test_invalid_parameters_names_input,
        invalid_parameters("inputdir=/data", "missing '@' prefix"),
        "inputdir=/data"
    );

    test_error_contains!(
        test_unresolved_variable,
        unresolved_variable("x", "x + 1"),
        "[x]",
        "x + 1"
    );

    test_error_contains!(
        test_invalid_operations_joins_problems,
        invalid_operations("Manager", &["Bogus".to_string(), "HasAsset".to_string()]),
        "Bogus",
        "HasAsset"
    );
}
