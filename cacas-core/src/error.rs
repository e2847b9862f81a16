//! Parameter validation errors.
//!
//! Invalid window lengths or multipliers are rejected at construction time;
//! everything downstream can then assume well-formed parameters. Missing or
//! thin data is never an error — those conditions surface as `None`/NaN.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("{name} window must be >= 1, got 0")]
    ZeroWindow { name: &'static str },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
}

/// Validate a window length.
pub fn require_window(name: &'static str, value: usize) -> Result<(), ParamError> {
    if value == 0 {
        return Err(ParamError::ZeroWindow { name });
    }
    Ok(())
}

/// Validate a strictly positive, finite multiplier.
pub fn require_positive(name: &'static str, value: f64) -> Result<(), ParamError> {
    if !value.is_finite() {
        return Err(ParamError::NotFinite { name, value });
    }
    if value <= 0.0 {
        return Err(ParamError::NonPositive { name, value });
    }
    Ok(())
}
