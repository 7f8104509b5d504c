use std::collections::HashMap;

use parse::{
    ast::{BinaryOperator, Function, Node},
    error::ParseError,
};

use crate::numeric::{trapezoid, two_sided_limit};

pub type Bindings = HashMap<String, f64>;

pub trait Evaluate {
    fn evaluate(&self, bindings: &Bindings) -> Result<f64, ParseError>;
}

pub fn apply_operator(operator: BinaryOperator, left: f64, right: f64) -> f64 {
    match operator {
        BinaryOperator::Add => left + right,
        BinaryOperator::Sub => left - right,
        BinaryOperator::Mul => left * right,
        BinaryOperator::Div => left / right,
        BinaryOperator::Pow => left.powf(right),
    }
}

pub fn apply_function(function: Function, x: f64) -> f64 {
    match function {
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
        Function::Ln => x.ln(),
        Function::Sqrt => x.sqrt(),
    }
}

/// Evaluates `expression` at successive values of one variable without
/// touching the caller's bindings.
struct Sweep<'a> {
    expression: &'a Node,
    variable: &'a str,
    bindings: Bindings,
}

impl<'a> Sweep<'a> {
    fn new(expression: &'a Node, variable: &'a str, bindings: &Bindings) -> Self {
        Self {
            expression,
            variable,
            bindings: bindings.clone(),
        }
    }

    fn sample(&mut self, x: f64) -> Result<f64, ParseError> {
        self.bindings.insert(self.variable.to_owned(), x);
        self.expression.evaluate(&self.bindings)
    }
}

impl Evaluate for Node {
    fn evaluate(&self, bindings: &Bindings) -> Result<f64, ParseError> {
        Ok(match self {
            Node::Number(x) => *x,
            Node::Variable(name) => *bindings
                .get(name)
                .ok_or_else(|| ParseError::UndefinedVariable(name.clone()))?,
            Node::Operation {
                operator,
                left,
                right,
            } => {
                let left = left.evaluate(bindings)?;
                let right = right.evaluate(bindings)?;
                apply_operator(*operator, left, right)
            }
            Node::Function { function, argument } => {
                apply_function(*function, argument.evaluate(bindings)?)
            }
            Node::Limit {
                expression,
                variable,
                point,
            } => {
                let mut sweep = Sweep::new(expression, variable, bindings);
                two_sided_limit(*point, |x| sweep.sample(x))?
            }
            Node::Integral {
                expression,
                lower,
                upper,
                variable,
            } => {
                let mut sweep = Sweep::new(expression, variable, bindings);
                trapezoid(*lower, *upper, |x| sweep.sample(x))?
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{E, PI};

    use super::*;
    use BinaryOperator::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    fn num(x: f64) -> Box<Node> {
        Box::new(Node::Number(x))
    }

    fn var(name: &str) -> Box<Node> {
        Box::new(Node::Variable(name.into()))
    }

    fn op(operator: BinaryOperator, left: Box<Node>, right: Box<Node>) -> Box<Node> {
        Box::new(Node::Operation {
            operator,
            left,
            right,
        })
    }

    fn bindings<const N: usize>(pairs: [(&str, f64); N]) -> Bindings {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn leaves() {
        assert_eq!(Node::Number(2.5).evaluate(&Bindings::new()), Ok(2.5));
        assert_eq!(
            Node::Variable("x".into()).evaluate(&bindings([("x", -3.0)])),
            Ok(-3.0)
        );
        assert_eq!(
            Node::Variable("x".into()).evaluate(&Bindings::new()),
            Err(ParseError::UndefinedVariable("x".into()))
        );
    }

    #[test]
    fn operators() {
        let b = Bindings::new();
        assert_eq!(op(Add, num(3.0), num(4.0)).evaluate(&b), Ok(7.0));
        assert_eq!(op(Sub, num(3.0), num(4.0)).evaluate(&b), Ok(-1.0));
        assert_eq!(op(Mul, num(3.0), num(4.0)).evaluate(&b), Ok(12.0));
        assert_eq!(op(Div, num(3.0), num(4.0)).evaluate(&b), Ok(0.75));
        assert_eq!(op(Pow, num(3.0), num(4.0)).evaluate(&b), Ok(81.0));
    }

    #[test]
    fn float_edge_cases_are_not_errors() {
        let b = Bindings::new();
        assert_eq!(op(Div, num(1.0), num(0.0)).evaluate(&b), Ok(f64::INFINITY));
        assert!(op(Div, num(0.0), num(0.0)).evaluate(&b).unwrap().is_nan());
        assert!(op(Pow, num(-8.0), num(0.5)).evaluate(&b).unwrap().is_nan());

        let ln = |x| Node::Function {
            function: Function::Ln,
            argument: num(x),
        };
        assert_eq!(ln(0.0).evaluate(&b), Ok(f64::NEG_INFINITY));
        assert!(ln(-1.0).evaluate(&b).unwrap().is_nan());
    }

    #[test]
    fn functions() {
        let call = |function, x| {
            Node::Function {
                function,
                argument: num(x),
            }
            .evaluate(&Bindings::new())
            .unwrap()
        };
        assert!((call(Function::Sin, PI / 2.0) - 1.0).abs() < 1e-12);
        assert!((call(Function::Cos, PI) + 1.0).abs() < 1e-12);
        assert!((call(Function::Tan, PI / 4.0) - 1.0).abs() < 1e-12);
        assert!((call(Function::Ln, E) - 1.0).abs() < 1e-12);
        assert_eq!(call(Function::Sqrt, 16.0), 4.0);
    }

    #[test]
    fn left_is_evaluated_before_right() {
        let node = op(Add, var("a"), var("b"));
        assert_eq!(
            node.evaluate(&Bindings::new()),
            Err(ParseError::UndefinedVariable("a".into()))
        );
    }

    #[test]
    fn limit_uses_private_bindings() {
        let node = Node::Limit {
            expression: op(Add, var("x"), var("c")),
            variable: "x".into(),
            point: 2.0,
        };
        let b = bindings([("x", 100.0), ("c", 1.0)]);
        let value = node.evaluate(&b).unwrap();
        assert!((value - 3.0).abs() < 1e-9, "{value}");
        assert_eq!(b, bindings([("x", 100.0), ("c", 1.0)]));
    }

    #[test]
    fn limit_does_not_exist() {
        let node = Node::Limit {
            expression: op(Div, num(1.0), var("x")),
            variable: "x".into(),
            point: 0.0,
        };
        assert_matches!(
            node.evaluate(&Bindings::new()),
            Err(ParseError::LimitDoesNotExist { left, right }) if left < 0.0 && right > 0.0
        );
    }

    #[test]
    fn integral_overrides_only_its_variable() {
        let node = Node::Integral {
            expression: op(Mul, var("k"), var("t")),
            lower: 0.0,
            upper: 2.0,
            variable: "t".into(),
        };
        let b = bindings([("k", 3.0), ("t", -5.0)]);
        let value = node.evaluate(&b).unwrap();
        assert!((value - 6.0).abs() < 1e-9, "{value}");
        assert_eq!(b["t"], -5.0);

        assert_eq!(
            node.evaluate(&bindings([("t", 1.0)])),
            Err(ParseError::UndefinedVariable("k".into()))
        );
    }

    #[test]
    fn nested_sweeps() {
        // ∫₀¹ lim_{y→0.5} (x + y) dx = ∫₀¹ (x + 0.5) dx
        let node = Node::Integral {
            expression: Box::new(Node::Limit {
                expression: op(Add, var("x"), var("y")),
                variable: "y".into(),
                point: 0.5,
            }),
            lower: 0.0,
            upper: 1.0,
            variable: "x".into(),
        };
        let value = node.evaluate(&Bindings::new()).unwrap();
        assert!((value - 1.0).abs() < 1e-9, "{value}");
    }
}
