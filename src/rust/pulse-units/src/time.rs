use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Result, UnitError};

/// Signed time, stored in the unit it was constructed with.
///
/// `s`, `ms` and `us` carry `f64`; `ns` carries `i64`. The wire form is a
/// single-key map such as `{"ns": 50}`, keyed by the stored unit.
#[derive(Debug, Clone, Copy, Serialize)]
pub enum Time {
    #[serde(rename = "s")]
    Seconds(f64),
    #[serde(rename = "ms")]
    Millis(f64),
    #[serde(rename = "us")]
    Micros(f64),
    #[serde(rename = "ns")]
    Nanos(i64),
}

/// Signed offset between two points in time.
pub type RelTime = Time;

impl Time {
    pub fn seconds(value: f64) -> Self {
        Time::Seconds(value)
    }

    pub fn millis(value: f64) -> Self {
        Time::Millis(value)
    }

    pub fn micros(value: f64) -> Self {
        Time::Micros(value)
    }

    pub fn nanos(value: i64) -> Self {
        Time::Nanos(value)
    }

    pub fn s(&self) -> f64 {
        match *self {
            Time::Seconds(value) => value,
            Time::Millis(value) => value * 1e-3,
            Time::Micros(value) => value * 1e-6,
            Time::Nanos(value) => value as f64 * 1e-9,
        }
    }

    pub fn ms(&self) -> f64 {
        self.s() * 1e3
    }

    pub fn us(&self) -> f64 {
        self.s() * 1e6
    }

    pub fn ns(&self) -> i64 {
        match *self {
            Time::Nanos(value) => value,
            other => (other.s() * 1e9).round() as i64,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.s() == 0.0
    }

    /// Parses a unit-suffixed literal such as `"50ns"` or `"1.5 us"`.
    pub fn parse(text: &str) -> Result<Self> {
        // Longest suffix first, so "50ns" is not split at the trailing "s".
        let units: [(&str, fn(f64) -> Time); 4] = [
            ("ns", |v| Time::Nanos(v.round() as i64)),
            ("us", Time::Micros),
            ("ms", Time::Millis),
            ("s", Time::Seconds),
        ];
        for (key, build) in units {
            if let Some((value, _)) = crate::split_suffix(text, &[key]) {
                let value = value
                    .parse::<f64>()
                    .map_err(|_| UnitError::parse("time", text))?;
                return Ok(build(value));
            }
        }
        Err(UnitError::parse("time", text))
    }

    /// Rebuilds a time in `self`'s unit from a value in seconds.
    fn with_seconds(&self, value: f64) -> Self {
        match self {
            Time::Seconds(_) => Time::Seconds(value),
            Time::Millis(_) => Time::Millis(value * 1e3),
            Time::Micros(_) => Time::Micros(value * 1e6),
            Time::Nanos(_) => Time::Nanos((value * 1e9).round() as i64),
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Time::Seconds(0.0)
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.s() == other.s()
    }
}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.s().partial_cmp(&other.s())
    }
}

impl Add for Time {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        match self {
            Time::Nanos(value) => Time::Nanos(value + rhs.ns()),
            other => other.with_seconds(other.s() + rhs.s()),
        }
    }
}

impl Sub for Time {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        match self {
            Time::Nanos(value) => Time::Nanos(value - rhs.ns()),
            other => other.with_seconds(other.s() - rhs.s()),
        }
    }
}

impl Neg for Time {
    type Output = Self;
    fn neg(self) -> Self {
        match self {
            Time::Nanos(value) => Time::Nanos(-value),
            other => other.with_seconds(-other.s()),
        }
    }
}

impl Mul<f64> for Time {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.with_seconds(self.s() * rhs)
    }
}

impl Div<f64> for Time {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        self.with_seconds(self.s() / rhs)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Time::Seconds(value) => write!(f, "{value} s"),
            Time::Millis(value) => write!(f, "{value} ms"),
            Time::Micros(value) => write!(f, "{value} us"),
            Time::Nanos(value) => write!(f, "{value} ns"),
        }
    }
}

impl FromStr for Time {
    type Err = UnitError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        enum Tagged {
            #[serde(rename = "s")]
            Seconds(f64),
            #[serde(rename = "ms")]
            Millis(f64),
            #[serde(rename = "us")]
            Micros(f64),
            #[serde(rename = "ns")]
            Nanos(i64),
        }
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Map(Tagged),
            Number(f64),
            Text(String),
        }
        match Input::deserialize(deserializer)? {
            Input::Map(Tagged::Seconds(value)) => Ok(Time::Seconds(value)),
            Input::Map(Tagged::Millis(value)) => Ok(Time::Millis(value)),
            Input::Map(Tagged::Micros(value)) => Ok(Time::Micros(value)),
            Input::Map(Tagged::Nanos(value)) => Ok(Time::Nanos(value)),
            Input::Number(value) if value == 0.0 => Ok(Time::Seconds(0.0)),
            Input::Number(value) => Err(serde::de::Error::custom(format!(
                "bare number {value} is not a valid time; use a unit-keyed map or the literal 0"
            ))),
            Input::Text(text) => Time::parse(&text).map_err(serde::de::Error::custom),
        }
    }
}

/// Nonnegative [`Time`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Duration(Time);

impl Duration {
    pub fn new(time: Time) -> Result<Self> {
        if time.s() < 0.0 {
            return Err(UnitError::negative("duration", time));
        }
        Ok(Duration(time))
    }

    pub fn zero() -> Self {
        Duration(Time::Seconds(0.0))
    }

    pub fn nanos(value: i64) -> Result<Self> {
        Self::new(Time::nanos(value))
    }

    pub fn micros(value: f64) -> Result<Self> {
        Self::new(Time::micros(value))
    }

    pub fn millis(value: f64) -> Result<Self> {
        Self::new(Time::millis(value))
    }

    pub fn seconds(value: f64) -> Result<Self> {
        Self::new(Time::seconds(value))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::new(Time::parse(text)?)
    }

    pub fn time(&self) -> Time {
        self.0
    }

    pub fn s(&self) -> f64 {
        self.0.s()
    }

    pub fn ms(&self) -> f64 {
        self.0.ms()
    }

    pub fn us(&self) -> f64 {
        self.0.us()
    }

    pub fn ns(&self) -> i64 {
        self.0.ns()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl From<Duration> for Time {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Add for Duration {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Duration(self.0 + rhs.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Duration {
    type Err = UnitError;
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let time = Time::deserialize(deserializer)?;
        Duration::new(time).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    #[test]
    fn accessors_convert() {
        let t = Time::micros(1.5);
        assert_eq!(t.us(), 1.5);
        assert_eq!(t.ns(), 1500);
        assert_eq!(t.s(), 1.5e-6);
    }

    #[test]
    fn equality_across_units() {
        assert_eq!(Time::micros(1.0), Time::nanos(1000));
        assert_eq!(Time::millis(0.5), Time::micros(500.0));
        assert!(Time::nanos(2) > Time::nanos(1));
        assert!(Time::nanos(-1) < Time::Seconds(0.0));
        assert_eq!(Time::Seconds(0.0), Time::Seconds(-0.0));
    }

    #[test]
    fn arithmetic_keeps_left_unit() {
        let sum = Time::nanos(50) + Time::micros(1.0);
        assert_eq!(sum, Time::Nanos(1050));
        let diff = Time::micros(2.0) - Time::nanos(500);
        assert_eq!(diff, Time::Micros(1.5));
        assert_eq!(-Time::nanos(3), Time::Nanos(-3));
        assert_eq!(Time::nanos(6) * 0.5, Time::Nanos(3));
    }

    #[test]
    fn wire_round_trip_is_lossless() {
        let t = Time::nanos(50);
        let value = serde_json::to_value(t).unwrap();
        assert_eq!(value, json!({"ns": 50}));
        let back: Time = serde_json::from_value(value).unwrap();
        assert!(matches!(back, Time::Nanos(50)));
    }

    #[test]
    fn accepts_zero_and_suffixed_strings() {
        let zero: Time = serde_json::from_value(json!(0)).unwrap();
        assert!(zero.is_zero());
        assert!(serde_json::from_value::<Time>(json!(5)).is_err());

        let t: Time = serde_json::from_value(json!("50ns")).unwrap();
        assert_eq!(t, Time::nanos(50));
        assert_eq!(Time::parse("1.5 us").unwrap(), Time::micros(1.5));
        assert_eq!(Time::parse("2ms").unwrap(), Time::millis(2.0));
        assert_eq!(Time::parse("0.1s").unwrap(), Time::seconds(0.1));
        assert!(Time::parse("5 lightyears").is_err());
    }

    #[test]
    fn duration_rejects_negative() {
        assert!(Duration::nanos(-1).is_err());
        assert!(Duration::parse("-50ns").is_err());
        assert!(serde_json::from_value::<Duration>(json!({"ns": -50})).is_err());
        let d: Duration = serde_json::from_value(json!({"us": 1.0})).unwrap();
        assert_eq!(d.ns(), 1000);
    }

    proptest! {
        #[test]
        fn nanos_round_trip(value in -1_000_000_000i64..1_000_000_000) {
            let t = Time::nanos(value);
            prop_assert_eq!(t.ns(), value);
            let json = serde_json::to_value(t).unwrap();
            let back: Time = serde_json::from_value(json).unwrap();
            prop_assert_eq!(back, t);
        }

        #[test]
        fn addition_is_commutative_on_the_canonical_axis(
            a in -1_000_000i64..1_000_000,
            b in -1_000_000i64..1_000_000,
        ) {
            let lhs = Time::nanos(a) + Time::nanos(b);
            let rhs = Time::nanos(b) + Time::nanos(a);
            prop_assert_eq!(lhs, rhs);
        }
    }
}
