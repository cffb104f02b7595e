//! Embedded equation engine
//!
//! Equations are parsed once into an immutable tree and evaluated many times
//! against per-resource variables.

mod ast;
mod eval;
mod format;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expression, Function, UnaryOp};
pub use eval::Variables;
pub use format::{PRECISE_DIGITS, SIGNIFICANT_DIGITS, format_g, format_number, format_precise};

use crate::error::{self, Result};
use eval::EvalError;

/// A parsed equation together with its source text
#[derive(Debug, Clone)]
pub struct Equation {
    source: String,
    expr: Expression,
}

impl Equation {
    pub fn parse(source: &str) -> Result<Self> {
        let expr = parser::parse(source)
            .map_err(|reason| error::expression_parse_failed(source, reason))?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expression(&self) -> &Expression {
        &self.expr
    }

    pub fn evaluate(&self, vars: &dyn Variables) -> Result<f64> {
        eval::evaluate(&self.expr, vars).map_err(|e| match e {
            EvalError::Unresolved(name) => error::unresolved_variable(name, &self.source),
            EvalError::NonNumeric { variable, value } => {
                error::non_numeric_variable(variable, value, &self.source)
            }
        })
    }

    /// Evaluates and interprets the result as a boolean
    pub fn is_true(&self, vars: &dyn Variables) -> Result<bool> {
        Ok(self.evaluate(vars)? != 0.0)
    }
}
