//! Built-in numeric functions
//!
//! Every function has the same shape, `fn(f64, f64) -> Result<f64, ArithmeticError>`,
//! so any of them can be handed to the registry as an operation body. Unary
//! functions (`square_root`) ignore their second argument.

use crate::error::ArithmeticError;

/// Signature shared by every registrable operation
pub type OperationFn = fn(f64, f64) -> Result<f64, ArithmeticError>;

pub fn add(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    Ok(a + b)
}

pub fn subtract(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    Ok(a - b)
}

pub fn multiply(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    Ok(a * b)
}

/// `a / b`, failing on a zero divisor
pub fn divide(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    if b == 0.0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    Ok(a / b)
}

/// `a` raised to `b` with IEEE-754 `powf` semantics
pub fn power(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    Ok(a.powf(b))
}

/// Floored modulus: the sign of the result follows the divisor
///
/// `modulus(-5, 3) == 1` and `modulus(5, -3) == -1`, unlike Rust's `%` which
/// follows the dividend.
pub fn modulus(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    if b == 0.0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    let r = a % b;
    if r != 0.0 && (r < 0.0) != (b < 0.0) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

/// `(a / b) * 100`
///
/// A zero divisor yields `0` instead of an error. This differs from [`divide`]
/// on purpose.
pub fn percentage(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    if b == 0.0 {
        return Ok(0.0);
    }
    Ok((a / b) * 100.0)
}

pub fn absolute_difference(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    Ok((a - b).abs())
}

/// Non-negative square root of `a`; the second argument is a placeholder
pub fn square_root(a: f64, _unused: f64) -> Result<f64, ArithmeticError> {
    if a < 0.0 {
        return Err(ArithmeticError::invalid_domain(format!(
            "cannot take the square root of negative number {}",
            a
        )));
    }
    // abs() folds sqrt(-0.0) == -0.0 into 0.0
    Ok(a.sqrt().abs())
}

/// Floor division after truncating both operands to integers
pub fn integer_division(a: f64, b: f64) -> Result<f64, ArithmeticError> {
    let (a, b) = (a.trunc(), b.trunc());
    if b == 0.0 {
        return Err(ArithmeticError::DivisionByZero);
    }
    Ok((a / b).floor())
}

/// Largest magnitude that can still carry a fractional part (2^52)
const MAX_FRACTIONAL: f64 = 4_503_599_627_370_496.0;

/// Round to `precision` decimal places, ties away from zero
///
/// `0.125` at precision 2 becomes `0.13` (not the banker's `0.12`). Values too
/// large to have fractional digits, or too large to scale, are returned as-is.
pub fn round_to(value: f64, precision: u32) -> f64 {
    if !value.is_finite() || value.abs() >= MAX_FRACTIONAL {
        return value;
    }
    let factor = 10_f64.powi(precision as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}
