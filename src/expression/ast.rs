//! Equation syntax tree

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

/// Built-in functions and constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Pi,
    E,
    Abs,
    Sqrt,
    Log,
    Ln,
    Log10,
    Exp,
    Sin,
    Cos,
    Tan,
    Sec,
    Csc,
    Cot,
    Asin,
    Acos,
    Atan,
    Atan2,
    Degs,
    Rads,
    Min,
    Max,
    Fmod,
    Floor,
    Ceil,
    Round,
}

impl Function {
    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name.to_lowercase().as_str() {
            "pi" => Self::Pi,
            "e" => Self::E,
            "abs" => Self::Abs,
            "sqrt" => Self::Sqrt,
            "log" => Self::Log,
            "ln" => Self::Ln,
            "log10" => Self::Log10,
            "exp" => Self::Exp,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "sec" => Self::Sec,
            "csc" => Self::Csc,
            "cot" => Self::Cot,
            "asin" => Self::Asin,
            "acos" => Self::Acos,
            "atan" => Self::Atan,
            "atan2" => Self::Atan2,
            "degs" => Self::Degs,
            "rads" => Self::Rads,
            "min" => Self::Min,
            "max" => Self::Max,
            "fmod" => Self::Fmod,
            "floor" => Self::Floor,
            "ceil" => Self::Ceil,
            "round" => Self::Round,
            _ => return None,
        };
        Some(function)
    }

    pub fn is_constant(self) -> bool {
        matches!(self, Self::Pi | Self::E)
    }

    /// Number of arguments the function takes
    pub fn arity(self) -> usize {
        match self {
            Self::Pi | Self::E => 0,
            Self::Atan2 | Self::Min | Self::Max | Self::Fmod => 2,
            _ => 1,
        }
    }
}

/// Immutable equation tree
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(f64),
    Variable(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Call {
        function: Function,
        args: Vec<Expression>,
    },
}

impl Expression {
    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Variable names in first-use order, without duplicates
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Variable(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Self::Unary { operand, .. } => operand.collect_variables(names),
            Self::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
            Self::Call { args, .. } => {
                for arg in args {
                    arg.collect_variables(names);
                }
            }
        }
    }
}
