//! Physical quantities for pulse-level control programs.
//!
//! Each quantity kind remembers the unit it was constructed with and
//! serializes as a single-key map such as `{"ns": 50}` or `{"V": 1.0}`, so
//! round-trips are lossless. Deserialization additionally accepts the bare
//! literal `0` and unit-suffixed strings such as `"50ns"` or `"100 mV"`.
//! Equality and ordering compare in a canonical unit, so `{"us": 1}` equals
//! `{"ns": 1000}`.

mod angle;
mod complex;
mod frequency;
mod scalar;
mod time;
mod voltage;

pub use angle::{Angle, Phase};
pub use complex::Complex;
pub use frequency::Frequency;
pub use time::{Duration, RelTime, Time};
pub use voltage::{Amplitude, ComplexVoltage, Magnitude, Threshold, Voltage};

pub type Result<T, E = UnitError> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    #[error("invalid {kind} literal: {text:?}")]
    Parse { kind: &'static str, text: String },
    #[error("{kind} must be nonnegative, got {text}")]
    Negative { kind: &'static str, text: String },
}

impl UnitError {
    pub(crate) fn parse(kind: &'static str, text: impl Into<String>) -> Self {
        UnitError::Parse {
            kind,
            text: text.into(),
        }
    }

    pub(crate) fn negative(kind: &'static str, text: impl std::fmt::Display) -> Self {
        UnitError::Negative {
            kind,
            text: text.to_string(),
        }
    }
}

/// Splits `"50 ns"` into value text and unit suffix. Suffixes are matched
/// longest-first by the caller, so `"ns"` wins over `"s"`.
pub(crate) fn split_suffix<'a>(text: &'a str, suffixes: &[&'a str]) -> Option<(&'a str, &'a str)> {
    let trimmed = text.trim();
    for suffix in suffixes {
        if let Some(value) = trimmed.strip_suffix(suffix) {
            return Some((value.trim_end(), suffix));
        }
    }
    None
}
