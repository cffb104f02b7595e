//! Expression evaluation

use super::ast::{BinaryOp, Expression, Function, UnaryOp};

/// Source of variable values for an evaluation
pub trait Variables {
    fn value(&self, name: &str) -> Option<&str>;
}

/// Why a variable could not be turned into a number
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    Unresolved(String),
    NonNumeric { variable: String, value: String },
}

fn truth(value: f64) -> bool {
    value != 0.0
}

fn boolean(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

pub fn evaluate(expr: &Expression, vars: &dyn Variables) -> Result<f64, EvalError> {
    match expr {
        Expression::Literal(value) => Ok(*value),
        Expression::Variable(name) => {
            let text = vars
                .value(name)
                .ok_or_else(|| EvalError::Unresolved(name.clone()))?;
            text.trim()
                .parse::<f64>()
                .map_err(|_| EvalError::NonNumeric {
                    variable: name.clone(),
                    value: text.to_string(),
                })
        }
        Expression::Unary { op, operand } => {
            let value = evaluate(operand, vars)?;
            Ok(match op {
                UnaryOp::Neg => -value,
                UnaryOp::Not => boolean(!truth(value)),
            })
        }
        Expression::Binary { op, left, right } => {
            let a = evaluate(left, vars)?;
            let b = evaluate(right, vars)?;
            Ok(apply_binary(*op, a, b))
        }
        Expression::Call { function, args } => {
            let values = args
                .iter()
                .map(|arg| evaluate(arg, vars))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(apply_function(*function, &values))
        }
    }
}

fn apply_binary(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::Mod => a % b,
        BinaryOp::Pow => a.powf(b),
        BinaryOp::Lt => boolean(a < b),
        BinaryOp::Le => boolean(a <= b),
        BinaryOp::Gt => boolean(a > b),
        BinaryOp::Ge => boolean(a >= b),
        BinaryOp::Eq => boolean(a == b),
        BinaryOp::Ne => boolean(a != b),
        BinaryOp::And => boolean(truth(a) && truth(b)),
        BinaryOp::Or => boolean(truth(a) || truth(b)),
    }
}

/// Arity is checked by the parser
fn apply_function(function: Function, args: &[f64]) -> f64 {
    let x = args.first().copied().unwrap_or(f64::NAN);
    let y = args.get(1).copied().unwrap_or(f64::NAN);
    match function {
        Function::Pi => std::f64::consts::PI,
        Function::E => std::f64::consts::E,
        Function::Abs => x.abs(),
        Function::Sqrt => x.sqrt(),
        Function::Log | Function::Ln => x.ln(),
        Function::Log10 => x.log10(),
        Function::Exp => x.exp(),
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
        Function::Sec => 1.0 / x.cos(),
        Function::Csc => 1.0 / x.sin(),
        Function::Cot => 1.0 / x.tan(),
        Function::Asin => x.asin(),
        Function::Acos => x.acos(),
        Function::Atan => x.atan(),
        Function::Atan2 => x.atan2(y),
        Function::Degs => x.to_degrees(),
        Function::Rads => x.to_radians(),
        Function::Min => x.min(y),
        Function::Max => x.max(y),
        Function::Fmod => x % y,
        Function::Floor => x.floor(),
        Function::Ceil => x.ceil(),
        Function::Round => x.round(),
    }
}
