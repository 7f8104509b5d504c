use log::{debug, trace};
use parse::error::ParseError;

/// Offset from the limit point at which each one-sided sample is taken.
pub const LIMIT_STEP: f64 = 1e-8;
/// Largest gap between the one-sided samples for which the limit exists.
pub const LIMIT_TOLERANCE: f64 = 1e-6;
/// Finite stand-in for an infinite limit point.
pub const INFINITY_SUBSTITUTE: f64 = 1e8;
pub const TRAPEZOID_INTERVALS: usize = 1000;

/// Estimates the limit of `f` at `point` from one sample on each side.
///
/// An infinite `point` is replaced by [`INFINITY_SUBSTITUTE`] with the same
/// sign and sampled once.
pub fn two_sided_limit(
    point: f64,
    mut f: impl FnMut(f64) -> Result<f64, ParseError>,
) -> Result<f64, ParseError> {
    if point.is_infinite() {
        return f(INFINITY_SUBSTITUTE.copysign(point));
    }

    let left = f(point - LIMIT_STEP)?;
    let right = f(point + LIMIT_STEP)?;
    trace!("limit at {point}: left {left}, right {right}");

    if (left - right).abs() < LIMIT_TOLERANCE {
        Ok((left + right) / 2.0)
    } else {
        Err(ParseError::LimitDoesNotExist { left, right })
    }
}

/// Composite trapezoidal rule over [`TRAPEZOID_INTERVALS`] equal steps.
pub fn trapezoid<E>(
    lower: f64,
    upper: f64,
    mut f: impl FnMut(f64) -> Result<f64, E>,
) -> Result<f64, E> {
    let dx = (upper - lower) / TRAPEZOID_INTERVALS as f64;
    let mut area = 0.0;

    for i in 0..=TRAPEZOID_INTERVALS {
        let y = f(lower + i as f64 * dx)?;
        area += if i == 0 || i == TRAPEZOID_INTERVALS {
            y / 2.0
        } else {
            y
        };
    }

    let area = area * dx;
    debug!("integral over [{lower}, {upper}] ≈ {area}");
    Ok(area)
}
