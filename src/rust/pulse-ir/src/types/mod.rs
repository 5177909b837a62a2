mod identifier;
mod integration;
mod iterable;
mod pulse;
mod reference;
mod value_or_var;

pub use identifier::Identifier;
pub use integration::Integration;
pub use iterable::{ArrayValues, Iterable, LinSpace, OneOrMany, Range, Scalar};
pub use pulse::*;
pub use reference::{ChannelRef, PulseRef, VariableRef};
pub use value_or_var::ValueOrVar;

/// serde `skip_serializing_if` callback for fields at their default value.
pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
