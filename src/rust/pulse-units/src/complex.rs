use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::UnitError;

/// Complex scalar serialized as a 2-element `[re, im]` pair, or as a bare
/// number when the imaginary part is zero.
///
/// Input additionally accepts a literal such as `"1.5+2j"` (input only).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Complex(pub Complex64);

impl Complex {
    pub fn new(re: f64, im: f64) -> Self {
        Complex(Complex64::new(re, im))
    }

    pub fn re(&self) -> f64 {
        self.0.re
    }

    pub fn im(&self) -> f64 {
        self.0.im
    }

    pub fn norm(&self) -> f64 {
        self.0.norm()
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Complex::new(re, 0.0)
    }
}

impl From<Complex64> for Complex {
    fn from(value: Complex64) -> Self {
        Complex(value)
    }
}

impl From<Complex> for Complex64 {
    fn from(value: Complex) -> Self {
        value.0
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.im < 0.0 {
            write!(f, "{}-{}j", self.0.re, -self.0.im)
        } else {
            write!(f, "{}+{}j", self.0.re, self.0.im)
        }
    }
}

impl FromStr for Complex {
    type Err = UnitError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_complex(text)
    }
}

/// Parses a Python-style complex literal: `"1.5+2j"`, `"-2j"`, `"(1+2j)"`,
/// or a plain real number.
pub(crate) fn parse_complex(text: &str) -> Result<Complex, UnitError> {
    let err = || UnitError::parse("complex", text);
    let mut body = text.trim();
    if let Some(inner) = body.strip_prefix('(') {
        body = inner.strip_suffix(')').ok_or_else(err)?.trim();
    }
    if body.is_empty() || body.contains(char::is_whitespace) {
        return Err(err());
    }
    let Some(body) = body.strip_suffix(['j', 'J']) else {
        let re = body.parse::<f64>().map_err(|_| err())?;
        return Ok(Complex::new(re, 0.0));
    };
    match split_imaginary(body) {
        Some((re, im)) => {
            let re = re.parse::<f64>().map_err(|_| err())?;
            let im = parse_signed_part(im).ok_or_else(err)?;
            Ok(Complex::new(re, im))
        }
        None => {
            let im = parse_signed_part(body).ok_or_else(err)?;
            Ok(Complex::new(0.0, im))
        }
    }
}

/// Splits `"1.5+2"` at the sign that separates real and imaginary parts,
/// skipping exponent signs as in `"1e-5+2"`.
fn split_imaginary(body: &str) -> Option<(&str, &str)> {
    let bytes = body.as_bytes();
    for idx in (1..bytes.len()).rev() {
        if (bytes[idx] == b'+' || bytes[idx] == b'-')
            && bytes[idx - 1] != b'e'
            && bytes[idx - 1] != b'E'
        {
            return Some((&body[..idx], &body[idx..]));
        }
    }
    None
}

fn parse_signed_part(text: &str) -> Option<f64> {
    match text {
        "" | "+" => Some(1.0),
        "-" => Some(-1.0),
        _ => text.parse::<f64>().ok(),
    }
}

impl Serialize for Complex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.im == 0.0 {
            return serializer.serialize_f64(self.0.re);
        }
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(&self.0.re)?;
        pair.serialize_element(&self.0.im)?;
        pair.end()
    }
}

struct ComplexVisitor;

impl<'de> Visitor<'de> for ComplexVisitor {
    type Value = Complex;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a `[re, im]` pair, a real number, or a complex literal string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Complex::new(value as f64, 0.0))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(Complex::new(value as f64, 0.0))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(Complex::new(value, 0.0))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        parse_complex(value).map_err(de::Error::custom)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let re: f64 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let im: f64 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        if seq.next_element::<f64>()?.is_some() {
            return Err(de::Error::invalid_length(3, &self));
        }
        Ok(Complex::new(re, im))
    }
}

impl<'de> Deserialize<'de> for Complex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ComplexVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_literals() {
        assert_eq!(parse_complex("1.5+2j").unwrap(), Complex::new(1.5, 2.0));
        assert_eq!(parse_complex("-1.5-2j").unwrap(), Complex::new(-1.5, -2.0));
        assert_eq!(parse_complex("2j").unwrap(), Complex::new(0.0, 2.0));
        assert_eq!(parse_complex("-j").unwrap(), Complex::new(0.0, -1.0));
        assert_eq!(parse_complex("(1+2j)").unwrap(), Complex::new(1.0, 2.0));
        assert_eq!(parse_complex("3.25").unwrap(), Complex::new(3.25, 0.0));
        assert_eq!(parse_complex("1e-5+2j").unwrap(), Complex::new(1e-5, 2.0));
        assert!(parse_complex("").is_err());
        assert!(parse_complex("1 + 2j").is_err());
        assert!(parse_complex("abc").is_err());
    }

    #[test]
    fn serializes_as_pair_or_bare_real() {
        let value = Complex::new(1.5, 2.0);
        assert_eq!(serde_json::to_value(value).unwrap(), json!([1.5, 2.0]));
        let real = Complex::new(1.0, 0.0);
        assert_eq!(serde_json::to_value(real).unwrap(), json!(1.0));
    }

    #[test]
    fn deserializes_all_input_forms() {
        let pair: Complex = serde_json::from_value(json!([1.5, 2.0])).unwrap();
        assert_eq!(pair, Complex::new(1.5, 2.0));
        let real: Complex = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(real, Complex::new(3.0, 0.0));
        let text: Complex = serde_json::from_value(json!("1.5+2j")).unwrap();
        assert_eq!(text, Complex::new(1.5, 2.0));
        assert!(serde_json::from_value::<Complex>(json!([1.0])).is_err());
        assert!(serde_json::from_value::<Complex>(json!([1.0, 2.0, 3.0])).is_err());
    }

    #[test]
    fn display_round_trips() {
        for value in [Complex::new(1.5, 2.0), Complex::new(-1.0, -0.5)] {
            assert_eq!(value.to_string().parse::<Complex>().unwrap(), value);
        }
    }
}
