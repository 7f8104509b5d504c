use std::fmt;

use log::trace;
use logos::Logos;

use crate::error::ParseError;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token<'a> {
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice())]
    Number(&'a str),
    /// A control sequence such as `\frac`, stored without its backslash.
    #[regex(r"\\[a-zA-Z]+", |lex| &lex.slice()[1..])]
    Command(&'a str),
    #[regex(r"[a-zA-Z]+", |lex| lex.slice())]
    Word(&'a str),
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("_")]
    Underscore,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    EndOfGroup,
    EndOfInput,
}

impl<'a> Token<'a> {
    pub fn to_small_string(&self) -> String {
        match self {
            Token::EndOfGroup => "end of group".into(),
            Token::EndOfInput => "end of input".into(),
            other => format!("'{other}'"),
        }
    }
}

impl<'a> fmt::Display for Token<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Number(text) | Token::Word(text) => f.write_str(text),
            Token::Command(name) => write!(f, r"\{name}"),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Asterisk => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::Caret => f.write_str("^"),
            Token::Underscore => f.write_str("_"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::EndOfGroup | Token::EndOfInput => Ok(()),
        }
    }
}

/// Splits `source` into tokens. Whitespace only separates tokens; any
/// character that starts no token is rejected rather than skipped.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, ParseError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = vec![];

    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => return Err(ParseError::InvalidToken(lexer.slice().into())),
        }
    }

    if tokens.is_empty() {
        return Err(ParseError::InvalidExpression);
    }

    trace!("tokenized {source:?} into {tokens:?}");
    Ok(tokens)
}
