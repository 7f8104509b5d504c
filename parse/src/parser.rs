use std::{
    f64::consts::{E, PI},
    str::FromStr,
};

use log::debug;

use crate::{
    ast::{BinaryOperator, Function, Node},
    error::ParseError,
    lexer::{Token, tokenize},
};

struct Tokens<'a> {
    tokens: &'a [Token<'a>],
    index: usize,
    end_token: Token<'a>,
}

impl<'a> Tokens<'a> {
    fn new(tokens: &'a [Token<'a>], end_token: Token<'a>) -> Self {
        Self {
            tokens,
            index: 0,
            end_token,
        }
    }

    fn peek(&self) -> &Token<'a> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> &Token<'a> {
        self.tokens.get(self.index + n).unwrap_or(&self.end_token)
    }

    fn next(&mut self) -> &Token<'a> {
        self.tokens
            .get(self.index)
            .inspect(|_| {
                self.index += 1;
            })
            .unwrap_or(&self.end_token)
    }

    fn braced_group(&mut self) -> Result<&'a [Token<'a>], ParseError> {
        let (inner, end) = extract_braced(self.tokens, self.index)?;
        self.index = end;
        Ok(inner)
    }

    /// A braced group, or a lone token as in `\int_0^1`.
    fn group_or_token(&mut self) -> Result<&'a [Token<'a>], ParseError> {
        match self.peek() {
            Token::LBrace => self.braced_group(),
            Token::Number(_) | Token::Word(_) | Token::Command(_) => {
                let tokens = self.tokens;
                self.index += 1;
                Ok(&tokens[self.index - 1..self.index])
            }
            other => Err(ParseError::UnsupportedExpression(format!(
                "expected group, found {}",
                other.to_small_string()
            ))),
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        let end_token = self.end_token;
        match self.next() {
            token if *token == end_token => Ok(()),
            Token::RBrace => Err(ParseError::UnmatchedBrace),
            other => Err(ParseError::UnsupportedExpression(format!(
                "unexpected {} after expression",
                other.to_small_string()
            ))),
        }
    }
}

/// Returns the tokens strictly inside the brace group opening at `start`,
/// along with the index just past its closing `}`.
pub fn extract_braced<'a>(
    tokens: &'a [Token<'a>],
    start: usize,
) -> Result<(&'a [Token<'a>], usize), ParseError> {
    if tokens.get(start) != Some(&Token::LBrace) {
        return Err(ParseError::UnmatchedBrace);
    }

    let mut depth = 0usize;

    for (index, token) in tokens.iter().enumerate().skip(start) {
        match token {
            Token::LBrace => depth += 1,
            Token::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&tokens[start + 1..index], index + 1));
                }
            }
            _ => {}
        }
    }

    Err(ParseError::UnmatchedBrace)
}

pub const ADD_PRECEDENCE: (u8, u8) = (5, 6);
pub const MUL_PRECEDENCE: (u8, u8) = (9, 10);
pub const POW_PRECEDENCE: (u8, u8) = (14, 13);
const NEG_PRECEDENCE: u8 = 7;

fn get_infix_op(token: &Token) -> Option<(BinaryOperator, u8, u8)> {
    let operator = BinaryOperator::try_from(token).ok()?;
    let (l_bp, r_bp) = match operator {
        BinaryOperator::Add | BinaryOperator::Sub => ADD_PRECEDENCE,
        BinaryOperator::Mul | BinaryOperator::Div => MUL_PRECEDENCE,
        BinaryOperator::Pow => POW_PRECEDENCE,
    };
    Some((operator, l_bp, r_bp))
}

fn binary(operator: BinaryOperator, left: Node, right: Node) -> Node {
    Node::Operation {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn parse(source: &str) -> Result<Node, ParseError> {
    let tokens = tokenize(source)?;
    let node = parse_tokens(&tokens)?;
    debug!("parsed {source:?} into {node:?}");
    Ok(node)
}

pub fn parse_tokens(tokens: &[Token]) -> Result<Node, ParseError> {
    parse_group(tokens, Token::EndOfInput)
}

fn parse_group<'a>(tokens: &'a [Token<'a>], end_token: Token<'a>) -> Result<Node, ParseError> {
    // a lone token must be a leaf
    match tokens {
        [Token::Number(_) | Token::Word(_) | Token::Command("pi")] => {}
        [token] => return Err(ParseError::InvalidToken(token.to_string())),
        _ => {}
    }

    let mut tokens = Tokens::new(tokens, end_token);
    let node = parse_expression(&mut tokens, 0)?;
    tokens.expect_end()?;
    Ok(node)
}

fn parse_number(text: &str) -> Result<Node, ParseError> {
    text.parse()
        .map(Node::Number)
        .map_err(|_| ParseError::InvalidToken(text.into()))
}

/// Reads an optionally signed number, `\pi` or `\infty` filling the whole of
/// `tokens`.
fn parse_signed_literal(tokens: &[Token]) -> Option<f64> {
    let (sign, rest) = match tokens {
        [Token::Minus, rest @ ..] => (-1.0, rest),
        [Token::Plus, rest @ ..] => (1.0, rest),
        rest => (1.0, rest),
    };
    let magnitude = match rest {
        [Token::Number(text)] => text.parse().ok()?,
        [Token::Command("pi")] => PI,
        [Token::Command("infty")] => f64::INFINITY,
        _ => return None,
    };
    Some(sign * magnitude)
}

/// The body of `\lim` or `\int`: a braced group, or a bare operand binding at
/// least as tightly as `min_bp`.
fn parse_body(tokens: &mut Tokens, min_bp: u8) -> Result<Node, ParseError> {
    if tokens.peek() == &Token::LBrace {
        parse_group(tokens.braced_group()?, Token::EndOfGroup)
    } else {
        parse_expression(tokens, min_bp)
    }
}

fn parse_frac(tokens: &mut Tokens) -> Result<Node, ParseError> {
    let mut argument = |name: &str| {
        if tokens.peek() != &Token::LBrace {
            return Err(ParseError::MalformedFraction(format!(
                "expected '{{' to open the {name}, found {}",
                tokens.peek().to_small_string()
            )));
        }
        tokens
            .braced_group()
            .map_err(|_| ParseError::MalformedFraction(format!("unclosed {name}")))
    };
    let num = argument("numerator")?;
    let den = argument("denominator")?;
    Ok(binary(
        BinaryOperator::Div,
        parse_group(num, Token::EndOfGroup)?,
        parse_group(den, Token::EndOfGroup)?,
    ))
}

fn parse_function(tokens: &mut Tokens, function: Function) -> Result<Node, ParseError> {
    let argument = parse_body(tokens, ADD_PRECEDENCE.1)?;
    Ok(Node::Function {
        function,
        argument: Box::new(argument),
    })
}

fn parse_limit(tokens: &mut Tokens) -> Result<Node, ParseError> {
    if tokens.next() != &Token::Underscore || tokens.peek() != &Token::LBrace {
        return Err(ParseError::MalformedLimit(
            r"expected '_{' after '\lim'".into(),
        ));
    }
    let approach = tokens
        .braced_group()
        .map_err(|_| ParseError::MalformedLimit("unclosed subscript".into()))?;

    let [Token::Word(variable), Token::Command("to"), point @ ..] = approach else {
        return Err(ParseError::MalformedLimit(
            r"expected a limit definition like 'x \to 0'".into(),
        ));
    };
    let Some(point) = parse_signed_literal(point) else {
        return Err(ParseError::MalformedLimit(format!(
            r"expected a number or '\infty' after '\to' in '{}'",
            approach.iter().map(ToString::to_string).collect::<String>()
        )));
    };

    let expression = parse_body(tokens, ADD_PRECEDENCE.1)?;
    Ok(Node::Limit {
        expression: Box::new(expression),
        variable: variable.to_string(),
        point,
    })
}

fn parse_integral_bound(tokens: &mut Tokens, marker: Token, name: &str) -> Result<f64, ParseError> {
    if tokens.next() != &marker {
        return Err(ParseError::MalformedIntegral(format!(
            "expected {} before the {name} bound",
            marker.to_small_string()
        )));
    }
    let group = tokens
        .group_or_token()
        .map_err(|_| ParseError::MalformedIntegral(format!("missing {name} bound")))?;
    match parse_signed_literal(group) {
        Some(bound) if bound.is_finite() => Ok(bound),
        _ => Err(ParseError::MalformedIntegral(format!(
            "{name} bound must be a finite number, found '{}'",
            group.iter().map(ToString::to_string).collect::<String>()
        ))),
    }
}

fn parse_integral(tokens: &mut Tokens) -> Result<Node, ParseError> {
    let lower = parse_integral_bound(tokens, Token::Underscore, "lower")?;
    let upper = parse_integral_bound(tokens, Token::Caret, "upper")?;

    // a bare integrand runs until the differential or the end of the group
    let expression = parse_body(tokens, 0)?;

    let variable = match tokens.peek() {
        &Token::Word(word) if word.len() > 1 && word.starts_with('d') => {
            tokens.next();
            word[1..].to_string()
        }
        _ => "x".to_string(),
    };

    Ok(Node::Integral {
        expression: Box::new(expression),
        lower,
        upper,
        variable,
    })
}

fn parse_operand(tokens: &mut Tokens, min_bp: u8) -> Result<Node, ParseError> {
    let token = *tokens.peek();
    match token {
        Token::Minus => {
            tokens.next();
            let arg = parse_expression(tokens, NEG_PRECEDENCE.max(min_bp))?;
            Ok(binary(BinaryOperator::Sub, Node::Number(0.0), arg))
        }
        Token::Number(text) => {
            tokens.next();
            parse_number(text)
        }
        Token::Word("e") if tokens.peek_nth(1) == &Token::Caret => {
            tokens.next();
            Ok(Node::Number(E))
        }
        Token::Word(name) => {
            tokens.next();
            Ok(Node::Variable(name.to_string()))
        }
        Token::Command(name) => {
            tokens.next();
            match name {
                "pi" => Ok(Node::Number(PI)),
                "frac" => parse_frac(tokens),
                "lim" => parse_limit(tokens),
                "int" => parse_integral(tokens),
                _ => match Function::from_str(name) {
                    Ok(function) => parse_function(tokens, function),
                    Err(_) if tokens.peek() == &Token::LBrace => {
                        Err(ParseError::UnsupportedFunction(name.into()))
                    }
                    Err(_) => Err(ParseError::InvalidToken(format!(r"\{name}"))),
                },
            }
        }
        Token::LParen => {
            tokens.next();
            let inner = parse_expression(tokens, 0)?;
            match tokens.next() {
                Token::RParen => Ok(inner),
                other => Err(ParseError::UnsupportedExpression(format!(
                    "expected ')', found {}",
                    other.to_small_string()
                ))),
            }
        }
        Token::LBrace => parse_group(tokens.braced_group()?, Token::EndOfGroup),
        Token::RBrace => Err(ParseError::UnmatchedBrace),
        Token::EndOfGroup | Token::EndOfInput => Err(ParseError::UnsupportedExpression(format!(
            "expected expression, found {}",
            token.to_small_string()
        ))),
        _ => Err(ParseError::InvalidToken(token.to_string())),
    }
}

fn parse_expression(tokens: &mut Tokens, min_bp: u8) -> Result<Node, ParseError> {
    let mut left = parse_operand(tokens, min_bp)?;

    while let Some((operator, l_bp, r_bp)) = get_infix_op(tokens.peek()) {
        if l_bp < min_bp {
            break;
        }

        tokens.next();
        let right = parse_expression(tokens, r_bp)?;
        left = binary(operator, left, right);
    }

    Ok(left)
}
