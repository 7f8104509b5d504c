use log::debug;
use parse::{error::ParseError, parser::parse};

use crate::evaluator::{Bindings, Evaluate};

/// Parses `source` and evaluates it once against `bindings`.
pub fn evaluate(source: &str, bindings: &Bindings) -> Result<f64, ParseError> {
    let node = parse(source)?;
    let value = node.evaluate(bindings)?;
    debug!("{source:?} evaluated to {value}");
    Ok(value)
}
