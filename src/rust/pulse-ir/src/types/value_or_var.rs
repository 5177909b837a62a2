use serde::{Deserialize, Serialize};

use super::VariableRef;

/// Field value that is either a concrete quantity or a reference to a
/// declared variable.
///
/// Untagged on the wire: input that parses as the quantity (including its
/// unit-suffixed string forms) is a value; any other string is a variable
/// name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueOrVar<T> {
    Value(T),
    Var(VariableRef),
}

impl<T> ValueOrVar<T> {
    pub fn var(name: impl Into<String>) -> crate::Result<Self> {
        Ok(ValueOrVar::Var(VariableRef::new(name)?))
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            ValueOrVar::Value(value) => Some(value),
            ValueOrVar::Var(_) => None,
        }
    }

    pub fn as_var(&self) -> Option<&VariableRef> {
        match self {
            ValueOrVar::Value(_) => None,
            ValueOrVar::Var(var) => Some(var),
        }
    }
}

impl<T> From<T> for ValueOrVar<T> {
    fn from(value: T) -> Self {
        ValueOrVar::Value(value)
    }
}
