use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize};

use crate::complex::{Complex, parse_complex};
use crate::scalar::quantity;
use crate::{Result, UnitError};

quantity! {
    /// Real-valued voltage; compared in volts.
    Voltage, kind = "voltage", zero = volts {
        Volts { key: "V", factor: 1.0, ctor: volts, get: v },
        Millivolts { key: "mV", factor: 1e-3, ctor: millivolts, get: mv },
    }
}

/// Discrimination threshold level.
pub type Threshold = Voltage;

/// Nonnegative [`Voltage`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Magnitude(Voltage);

impl Magnitude {
    pub fn new(voltage: Voltage) -> Result<Self> {
        if voltage.v() < 0.0 {
            return Err(UnitError::negative("magnitude", voltage));
        }
        Ok(Magnitude(voltage))
    }

    pub fn volts(value: f64) -> Result<Self> {
        Self::new(Voltage::volts(value))
    }

    pub fn millivolts(value: f64) -> Result<Self> {
        Self::new(Voltage::millivolts(value))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::new(Voltage::parse(text)?)
    }

    pub fn voltage(&self) -> Voltage {
        self.0
    }

    pub fn v(&self) -> f64 {
        self.0.v()
    }

    pub fn mv(&self) -> f64 {
        self.0.mv()
    }
}

impl From<Magnitude> for Voltage {
    fn from(value: Magnitude) -> Self {
        value.0
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Magnitude {
    type Err = UnitError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl<'de> Deserialize<'de> for Magnitude {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let voltage = Voltage::deserialize(deserializer)?;
        Magnitude::new(voltage).map_err(serde::de::Error::custom)
    }
}

/// Complex-valued voltage, e.g. an IQ pulse amplitude; compared in volts.
///
/// The complex value serializes as a `[re, im]` pair inside the unit map,
/// e.g. `{"V": [1.0, 0.5]}`, or as a bare real when the imaginary part is
/// zero. Input also accepts literals such as `{"mV": "1.5+2j"}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum ComplexVoltage {
    #[serde(rename = "V")]
    Volts(Complex),
    #[serde(rename = "mV")]
    Millivolts(Complex),
}

/// Complex pulse amplitude.
pub type Amplitude = ComplexVoltage;

impl ComplexVoltage {
    pub fn volts(value: impl Into<Complex>) -> Self {
        ComplexVoltage::Volts(value.into())
    }

    pub fn millivolts(value: impl Into<Complex>) -> Self {
        ComplexVoltage::Millivolts(value.into())
    }

    pub fn v(&self) -> Complex64 {
        match *self {
            ComplexVoltage::Volts(value) => value.0,
            ComplexVoltage::Millivolts(value) => value.0 * 1e-3,
        }
    }

    pub fn mv(&self) -> Complex64 {
        self.v() * 1e3
    }

    pub fn is_zero(&self) -> bool {
        self.v() == Complex64::zero()
    }

    /// Parses a unit-suffixed literal such as `"0.5V"` or `"1.5+2j mV"`.
    pub fn parse(text: &str) -> Result<Self> {
        let units: [(&str, fn(Complex) -> ComplexVoltage); 2] = [
            ("mV", ComplexVoltage::Millivolts),
            ("V", ComplexVoltage::Volts),
        ];
        for (key, build) in units {
            if let Some((value, _)) = crate::split_suffix(text, &[key]) {
                let value =
                    parse_complex(value).map_err(|_| UnitError::parse("voltage", text))?;
                return Ok(build(value));
            }
        }
        Err(UnitError::parse("voltage", text))
    }
}

impl From<Voltage> for ComplexVoltage {
    fn from(value: Voltage) -> Self {
        match value {
            Voltage::Volts(v) => ComplexVoltage::volts(v),
            Voltage::Millivolts(v) => ComplexVoltage::millivolts(v),
        }
    }
}

impl PartialEq for ComplexVoltage {
    fn eq(&self, other: &Self) -> bool {
        self.v() == other.v()
    }
}

impl fmt::Display for ComplexVoltage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplexVoltage::Volts(value) => write!(f, "{value} V"),
            ComplexVoltage::Millivolts(value) => write!(f, "{value} mV"),
        }
    }
}

impl FromStr for ComplexVoltage {
    type Err = UnitError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl<'de> Deserialize<'de> for ComplexVoltage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        enum Tagged {
            #[serde(rename = "V")]
            Volts(Complex),
            #[serde(rename = "mV")]
            Millivolts(Complex),
        }
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Map(Tagged),
            Number(f64),
            Text(String),
        }
        match Input::deserialize(deserializer)? {
            Input::Map(Tagged::Volts(value)) => Ok(ComplexVoltage::Volts(value)),
            Input::Map(Tagged::Millivolts(value)) => Ok(ComplexVoltage::Millivolts(value)),
            Input::Number(value) if value == 0.0 => Ok(ComplexVoltage::volts(0.0)),
            Input::Number(value) => Err(serde::de::Error::custom(format!(
                "bare number {value} is not a valid voltage; use a unit-keyed map or the literal 0"
            ))),
            Input::Text(text) => ComplexVoltage::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}
