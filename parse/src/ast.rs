use std::{
    f64::consts::{E, PI},
    fmt,
};

use derive_more::Display;
use strum::EnumString;

use crate::{error::ParseError, lexer::Token};

#[derive(Debug, PartialEq, Clone, Copy, Display)]
pub enum BinaryOperator {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display(r"\cdot")]
    Mul,
    #[display("/")]
    Div,
    #[display("^")]
    Pow,
}

impl BinaryOperator {
    fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Sub => 1,
            BinaryOperator::Mul => 2,
            // rendered as \frac and {}^{} which are self-delimiting
            BinaryOperator::Div | BinaryOperator::Pow => 3,
        }
    }
}

impl<'a> TryFrom<&Token<'a>> for BinaryOperator {
    type Error = ParseError;

    fn try_from(token: &Token<'a>) -> Result<Self, Self::Error> {
        Ok(match token {
            Token::Plus => BinaryOperator::Add,
            Token::Minus => BinaryOperator::Sub,
            Token::Asterisk | Token::Command("cdot" | "times") => BinaryOperator::Mul,
            Token::Slash => BinaryOperator::Div,
            Token::Caret => BinaryOperator::Pow,
            other => return Err(ParseError::UnsupportedOperator(other.to_small_string())),
        })
    }
}

/// Functions callable as `\name{argument}`. The string forms are the
/// command names without the backslash.
#[derive(Debug, PartialEq, Clone, Copy, EnumString, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Ln,
    Sqrt,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Node {
    Number(f64),
    Variable(String),
    Operation {
        operator: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    Function {
        function: Function,
        argument: Box<Node>,
    },
    /// Two-sided limit of `expression` as `variable` approaches `point`,
    /// which may be infinite.
    Limit {
        expression: Box<Node>,
        variable: String,
        point: f64,
    },
    Integral {
        expression: Box<Node>,
        lower: f64,
        upper: f64,
        variable: String,
    },
}

impl Node {
    fn precedence(&self) -> u8 {
        match self {
            Node::Operation { operator, .. } => operator.precedence(),
            _ => u8::MAX,
        }
    }
}

struct Point(f64);

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            x if x == f64::INFINITY => write!(f, r"\infty"),
            x if x == f64::NEG_INFINITY => write!(f, r"-\infty"),
            x => write!(f, "{x}"),
        }
    }
}

/// Writes `node`, wrapped in parentheses when it binds looser than
/// `min_precedence`.
fn write_operand(f: &mut fmt::Formatter, node: &Node, min_precedence: u8) -> fmt::Result {
    if node.precedence() < min_precedence {
        write!(f, "({node})")
    } else {
        write!(f, "{node}")
    }
}

/// Renders LaTeX that parses back into an equal tree.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Number(x) if *x == PI => write!(f, r"\pi"),
            Node::Number(x) if *x < 0.0 => write!(f, "({x})"),
            Node::Number(x) => write!(f, "{x}"),
            Node::Variable(name) => write!(f, "{name}"),
            Node::Operation {
                operator: BinaryOperator::Div,
                left,
                right,
            } => write!(f, r"\frac{{{left}}}{{{right}}}"),
            Node::Operation {
                operator: BinaryOperator::Pow,
                left,
                right,
            } => match left.as_ref() {
                Node::Number(x) if *x == E => write!(f, "e^{{{right}}}"),
                _ => write!(f, "{{{left}}}^{{{right}}}"),
            },
            Node::Operation {
                operator,
                left,
                right,
            } => {
                let precedence = operator.precedence();
                write_operand(f, left, precedence)?;
                write!(f, " {operator} ")?;
                write_operand(f, right, precedence + 1)
            }
            Node::Function { function, argument } => write!(f, r"\{function}{{{argument}}}"),
            Node::Limit {
                expression,
                variable,
                point,
            } => write!(
                f,
                r"\lim_{{{variable} \to {}}}{{{expression}}}",
                Point(*point)
            ),
            Node::Integral {
                expression,
                lower,
                upper,
                variable,
            } => write!(
                f,
                r"\int_{{{}}}^{{{}}}{{{expression}}} d{variable}",
                Point(*lower),
                Point(*upper)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn num(x: f64) -> Box<Node> {
        Box::new(Node::Number(x))
    }

    fn var(name: &str) -> Box<Node> {
        Box::new(Node::Variable(name.into()))
    }

    #[test]
    fn function_names() {
        assert_eq!(Function::from_str("sqrt"), Ok(Function::Sqrt));
        assert_eq!(Function::from_str("ln"), Ok(Function::Ln));
        assert!(Function::from_str("cot").is_err());
    }

    #[test]
    fn operator_from_token() {
        assert_eq!(
            BinaryOperator::try_from(&Token::Caret),
            Ok(BinaryOperator::Pow)
        );
        assert_eq!(
            BinaryOperator::try_from(&Token::Command("times")),
            Ok(BinaryOperator::Mul)
        );
        assert_matches!(
            BinaryOperator::try_from(&Token::LBrace),
            Err(ParseError::UnsupportedOperator(_))
        );
    }

    #[test]
    fn display_parenthesizes_by_precedence() {
        let sum = Node::Operation {
            operator: BinaryOperator::Add,
            left: var("a"),
            right: num(1.0),
        };
        let product = Node::Operation {
            operator: BinaryOperator::Mul,
            left: Box::new(sum.clone()),
            right: var("b"),
        };
        assert_eq!(product.to_string(), r"(a + 1) \cdot b");

        let difference = Node::Operation {
            operator: BinaryOperator::Sub,
            left: var("c"),
            right: Box::new(sum),
        };
        assert_eq!(difference.to_string(), "c - (a + 1)");
    }

    #[test]
    fn display_special_forms() {
        let limit = Node::Limit {
            expression: Box::new(Node::Operation {
                operator: BinaryOperator::Div,
                left: num(1.0),
                right: var("x"),
            }),
            variable: "x".into(),
            point: f64::NEG_INFINITY,
        };
        assert_eq!(limit.to_string(), r"\lim_{x \to -\infty}{\frac{1}{x}}");

        let integral = Node::Integral {
            expression: Box::new(Node::Function {
                function: Function::Sin,
                argument: var("t"),
            }),
            lower: 0.0,
            upper: 2.5,
            variable: "t".into(),
        };
        assert_eq!(integral.to_string(), r"\int_{0}^{2.5}{\sin{t}} dt");

        let exponential = Node::Operation {
            operator: BinaryOperator::Pow,
            left: num(E),
            right: num(PI),
        };
        assert_eq!(exponential.to_string(), r"e^{\pi}");
    }
}
