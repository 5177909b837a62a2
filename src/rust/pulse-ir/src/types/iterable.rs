use std::fmt;

use num_complex::Complex64;
use pulse_units::Complex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Numeric literal: integer, float or complex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Complex(Complex),
}

impl Scalar {
    pub fn as_complex(&self) -> Complex64 {
        match *self {
            Scalar::Int(value) => Complex64::new(value as f64, 0.0),
            Scalar::Float(value) => Complex64::new(value, 0.0),
            Scalar::Complex(value) => value.0,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Complex(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<Complex> for Scalar {
    fn from(value: Complex) -> Self {
        Scalar::Complex(value)
    }
}

/// `num` evenly spaced points from `start` to `stop`, both inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinSpace {
    pub start: Scalar,
    pub stop: Scalar,
    pub num: usize,
}

impl LinSpace {
    pub fn new(start: impl Into<Scalar>, stop: impl Into<Scalar>, num: usize) -> Result<Self> {
        let start = start.into();
        let stop = stop.into();
        if num == 0 {
            return Err(Error::LinSpace("num must be at least 1".into()));
        }
        if num == 1 && start.as_complex() != stop.as_complex() {
            return Err(Error::LinSpace(format!(
                "a single point cannot span from {start} to {stop}"
            )));
        }
        Ok(LinSpace { start, stop, num })
    }

    pub fn len(&self) -> usize {
        self.num
    }

    pub fn is_empty(&self) -> bool {
        self.num == 0
    }
}

impl<'de> Deserialize<'de> for LinSpace {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            start: Scalar,
            stop: Scalar,
            num: usize,
        }
        let raw = Raw::deserialize(deserializer)?;
        LinSpace::new(raw.start, raw.stop, raw.num).map_err(serde::de::Error::custom)
    }
}

/// Arithmetic progression from `start` to `stop`, both inclusive. The step
/// must walk from `start` to `stop` in a whole number of increments.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub start: Scalar,
    pub stop: Scalar,
    pub step: Scalar,
}

impl Range {
    pub fn new(
        start: impl Into<Scalar>,
        stop: impl Into<Scalar>,
        step: impl Into<Scalar>,
    ) -> Result<Self> {
        let start = start.into();
        let stop = stop.into();
        let step = step.into();
        step_count(start, stop, step)?;
        Ok(Range { start, stop, step })
    }

    pub fn len(&self) -> usize {
        match step_count(self.start, self.stop, self.step) {
            Ok(count) => count + 1,
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn step_count(start: Scalar, stop: Scalar, step: Scalar) -> Result<usize> {
    let span = stop.as_complex() - start.as_complex();
    let step = step.as_complex();
    if step == Complex64::new(0.0, 0.0) {
        if span == Complex64::new(0.0, 0.0) {
            return Ok(0);
        }
        return Err(Error::Range(
            "step must be nonzero when start and stop differ".into(),
        ));
    }
    let quotient = span / step;
    let count = quotient.re.round();
    if count < 0.0 {
        return Err(Error::Range(format!(
            "step {step} walks away from stop {stop}"
        )));
    }
    let tolerance = 1e-9 * count.abs().max(1.0);
    if (quotient - Complex64::new(count, 0.0)).norm() > tolerance {
        return Err(Error::Range(format!(
            "step {step} does not evenly divide the span from {start} to {stop}"
        )));
    }
    Ok(count as usize)
}

impl<'de> Deserialize<'de> for Range {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Raw {
            start: Scalar,
            stop: Scalar,
            step: Scalar,
        }
        let raw = Raw::deserialize(deserializer)?;
        Range::new(raw.start, raw.stop, raw.step).map_err(serde::de::Error::custom)
    }
}

/// Homogeneous 1-D array of explicit values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArrayValues {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Complex(Vec<Complex>),
}

impl ArrayValues {
    pub fn len(&self) -> usize {
        match self {
            ArrayValues::Int(values) => values.len(),
            ArrayValues::Float(values) => values.len(),
            ArrayValues::Complex(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One iteration axis: a linear space, a stepped range, explicit numeric
/// values or a list of labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Iterable {
    // The array forms must precede the struct forms: serde's derived struct
    // deserializers also accept sequences, so an untagged match that tried
    // `LinSpace` first would swallow a bare 3-element numeric array.
    Values(ArrayValues),
    Labels(Vec<String>),
    Space(LinSpace),
    Steps(Range),
}

impl Iterable {
    pub fn len(&self) -> usize {
        match self {
            Iterable::Space(space) => space.len(),
            Iterable::Steps(range) => range.len(),
            Iterable::Values(values) => values.len(),
            Iterable::Labels(labels) => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<LinSpace> for Iterable {
    fn from(space: LinSpace) -> Self {
        Iterable::Space(space)
    }
}

impl From<Range> for Iterable {
    fn from(range: Range) -> Self {
        Iterable::Steps(range)
    }
}

impl From<ArrayValues> for Iterable {
    fn from(values: ArrayValues) -> Self {
        Iterable::Values(values)
    }
}

impl From<Vec<i64>> for Iterable {
    fn from(values: Vec<i64>) -> Self {
        Iterable::Values(ArrayValues::Int(values))
    }
}

impl From<Vec<f64>> for Iterable {
    fn from(values: Vec<f64>) -> Self {
        Iterable::Values(ArrayValues::Float(values))
    }
}

impl From<Vec<String>> for Iterable {
    fn from(labels: Vec<String>) -> Self {
        Iterable::Labels(labels)
    }
}

impl From<Vec<&str>> for Iterable {
    fn from(labels: Vec<&str>) -> Self {
        Iterable::Labels(labels.into_iter().map(str::to_owned).collect())
    }
}

/// A single entry or a list; a bare entry serializes without brackets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(entry) => std::slice::from_ref(entry),
            OneOrMany::Many(entries) => entries,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn is_many(&self) -> bool {
        matches!(self, OneOrMany::Many(_))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(entry: T) -> Self {
        OneOrMany::One(entry)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(entries: Vec<T>) -> Self {
        OneOrMany::Many(entries)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn linspace_validates_num() {
        assert!(LinSpace::new(0, 10, 0).is_err());
        assert!(LinSpace::new(0, 10, 1).is_err());
        assert_eq!(LinSpace::new(5, 5, 1).unwrap().len(), 1);
        assert_eq!(LinSpace::new(10, 20, 3).unwrap().len(), 3);
    }

    #[test]
    fn range_requires_an_even_division() {
        assert_eq!(Range::new(0, 5, 1).unwrap().len(), 6);
        assert_eq!(Range::new(0.0, 1.0, 0.25).unwrap().len(), 5);
        assert_eq!(Range::new(5, 1, -2).unwrap().len(), 3);
        assert!(Range::new(0, 5, 2).is_err());
        assert!(Range::new(0, 5, 0).is_err());
        assert!(Range::new(0, 5, -1).is_err());
        assert_eq!(Range::new(3, 3, 0).unwrap().len(), 1);
    }

    #[test]
    fn range_wire_form() {
        let range = Range::new(3, 5, 1).unwrap();
        assert_eq!(
            serde_json::to_value(range).unwrap(),
            json!({"start": 3, "stop": 5, "step": 1})
        );
        assert!(serde_json::from_value::<Range>(json!({"start": 0, "stop": 5, "step": 2})).is_err());
        assert!(serde_json::from_value::<Range>(json!({"start": 0, "stop": 5, "num": 5})).is_err());
    }

    #[test]
    fn iterable_input_forms() {
        let space: Iterable = serde_json::from_value(json!({"start": 10, "stop": 20, "num": 3}))
            .unwrap();
        assert!(matches!(space, Iterable::Space(_)));

        let values: Iterable = serde_json::from_value(json!([0, 1, 2])).unwrap();
        assert_eq!(values, Iterable::Values(ArrayValues::Int(vec![0, 1, 2])));

        let labels: Iterable = serde_json::from_value(json!(["a", "b", "c"])).unwrap();
        assert_eq!(labels, Iterable::from(vec!["a", "b", "c"]));

        // Two-element numeric sublists are complex pairs, as in the pair
        // wire form of a complex scalar.
        let pairs: Iterable = serde_json::from_value(json!([[1, 2], [3, 4]])).unwrap();
        assert_eq!(
            pairs,
            Iterable::Values(ArrayValues::Complex(vec![
                Complex::new(1.0, 2.0),
                Complex::new(3.0, 4.0),
            ]))
        );
    }

    #[test]
    fn one_or_many_wire_forms() {
        let one: OneOrMany<Iterable> = serde_json::from_value(json!(["a", "b"])).unwrap();
        assert!(matches!(one, OneOrMany::One(Iterable::Labels(_))));

        let many: OneOrMany<Iterable> =
            serde_json::from_value(json!([[0, 1, 2], {"start": 3, "stop": 5, "step": 1}]))
                .unwrap();
        assert!(many.is_many());
        assert_eq!(many.len(), 2);
    }
}
