//! Control-flow nodes shared by both program flavors. Each node carries its
//! `op_type` discriminator as a constant tag validated on input; the body
//! type decides the flavor.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{Iterable, OneOrMany, VariableRef};
use crate::{Error, Result};

/// Declares a unit struct that serializes as a fixed discriminator string
/// and rejects anything else on input.
macro_rules! op_tag {
    ($name:ident, $text:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $name;

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($text)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let tag = String::deserialize(deserializer)?;
                if tag == $text {
                    Ok($name)
                } else {
                    Err(serde::de::Error::invalid_value(
                        serde::de::Unexpected::Str(&tag),
                        &concat!("\"", $text, "\""),
                    ))
                }
            }
        }
    };
}

op_tag!(RepeatTag, "repeat");
op_tag!(ForTag, "for");
op_tag!(IfTag, "if");

/// Run the body a fixed number of times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepetitionBase<B> {
    #[serde(rename = "op_type")]
    tag: RepeatTag,
    pub count: u32,
    pub body: B,
}

impl<B> RepetitionBase<B> {
    pub fn new(count: u32, body: B) -> Self {
        RepetitionBase {
            tag: RepeatTag,
            count,
            body,
        }
    }
}

/// Run the body once per entry of the iterables, binding the loop
/// variables.
///
/// `var` and `items` are either both single or equally long lists; in the
/// list form every iterable must have the same length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationBase<B> {
    #[serde(rename = "op_type")]
    tag: ForTag,
    pub var: OneOrMany<VariableRef>,
    pub items: OneOrMany<Iterable>,
    pub body: B,
}

impl<B> IterationBase<B> {
    pub fn new(
        var: impl Into<OneOrMany<VariableRef>>,
        items: impl Into<OneOrMany<Iterable>>,
        body: B,
    ) -> Result<Self> {
        let var = var.into();
        let items = items.into();
        validate_iteration(&var, &items)?;
        Ok(IterationBase {
            tag: ForTag,
            var,
            items,
            body,
        })
    }

    /// Number of loop passes.
    pub fn len(&self) -> usize {
        self.items.as_slice().first().map_or(0, Iterable::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn validate_iteration(
    var: &OneOrMany<VariableRef>,
    items: &OneOrMany<Iterable>,
) -> Result<()> {
    match (var, items) {
        (OneOrMany::One(_), OneOrMany::One(_)) => Ok(()),
        (OneOrMany::Many(vars), OneOrMany::Many(iterables)) => {
            if vars.len() != iterables.len() {
                return Err(Error::IterationArity {
                    vars: vars.len(),
                    iterables: iterables.len(),
                });
            }
            let lengths: Vec<usize> = iterables.iter().map(Iterable::len).collect();
            if lengths.windows(2).any(|pair| pair[0] != pair[1]) {
                return Err(Error::IterationLength { lengths });
            }
            Ok(())
        }
        _ => Err(Error::IterationShape),
    }
}

impl<'de, B: Deserialize<'de>> Deserialize<'de> for IterationBase<B> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw<B> {
            #[serde(rename = "op_type")]
            _tag: ForTag,
            var: OneOrMany<VariableRef>,
            items: OneOrMany<Iterable>,
            body: B,
        }
        let raw = Raw::<B>::deserialize(deserializer)?;
        IterationBase::new(raw.var, raw.items, raw.body).map_err(serde::de::Error::custom)
    }
}

/// Run the body only when the condition variable is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalBase<B> {
    #[serde(rename = "op_type")]
    tag: IfTag,
    pub var: VariableRef,
    pub body: B,
}

impl<B> ConditionalBase<B> {
    pub fn new(var: VariableRef, body: B) -> Self {
        ConditionalBase {
            tag: IfTag,
            var,
            body,
        }
    }
}
