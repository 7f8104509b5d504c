use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("invalid LaTeX expression")]
    InvalidExpression,
    #[error("invalid token '{0}'")]
    InvalidToken(String),
    #[error(r"malformed '\frac': {0}")]
    MalformedFraction(String),
    #[error(r"malformed '\lim': {0}")]
    MalformedLimit(String),
    #[error(r"malformed '\int': {0}")]
    MalformedIntegral(String),
    #[error("unmatched braces in expression")]
    UnmatchedBrace,
    #[error("unsupported or complex expression format: {0}")]
    UnsupportedExpression(String),
    #[error("variable '{0}' not found in bindings")]
    UndefinedVariable(String),
    #[error("limit does not exist: left side approaches {left}, right side approaches {right}")]
    LimitDoesNotExist { left: f64, right: f64 },
    /// Only reachable for commands that look like function calls but name no
    /// known function, e.g. `\cot{x}`.
    #[error("unsupported function '{0}'")]
    UnsupportedFunction(String),
    #[error("unsupported operator {0}")]
    UnsupportedOperator(String),
}
