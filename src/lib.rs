//! Numeric evaluation of a small LaTeX subset: arithmetic, `\frac`,
//! elementary functions, `\lim` and definite `\int`.
//!
//! ```
//! use abyssal::{Bindings, evaluate};
//!
//! let bindings = Bindings::from([("x".to_string(), 2.0)]);
//! assert_eq!(evaluate("x + 4", &bindings), Ok(6.0));
//! ```

pub use eval::{
    engine::evaluate,
    evaluator::{Bindings, Evaluate},
    numeric,
};
pub use parse::{
    ast::{BinaryOperator, Function, Node},
    error::ParseError,
    lexer::{Token, tokenize},
    parser::{extract_braced, parse, parse_tokens},
};
