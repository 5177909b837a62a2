use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::control_flow::{ConditionalBase, IterationBase, RepetitionBase};
use crate::operation::Operation;

/// Fixed-count loop over a sequence body.
pub type Repetition = RepetitionBase<Sequence>;
/// Variable-binding loop over a sequence body.
pub type Iteration = IterationBase<Sequence>;
/// Conditionally executed sequence body.
pub type Conditional = ConditionalBase<Sequence>;

/// One entry of a [`Sequence`]: a leaf operation, a control-flow node or a
/// nested sequence. Untagged on the wire; leaves carry their `op_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SequenceItem {
    Op(Operation),
    Repeat(Repetition),
    For(Iteration),
    If(Conditional),
    Nested(Sequence),
}

impl From<Operation> for SequenceItem {
    fn from(op: Operation) -> Self {
        SequenceItem::Op(op)
    }
}

macro_rules! impl_from_leaf {
    ($($leaf:ident),+ $(,)?) => {
        $(
            impl From<crate::operation::$leaf> for SequenceItem {
                fn from(op: crate::operation::$leaf) -> Self {
                    SequenceItem::Op(op.into())
                }
            }
        )+
    };
}

impl_from_leaf!(
    Play,
    Wait,
    Barrier,
    SetFrequency,
    ShiftFrequency,
    SetPhase,
    ShiftPhase,
    Record,
    Trace,
    CompensateDc,
    VariableDecl,
    PulseDecl,
    Discriminate,
    Store,
);

impl From<Repetition> for SequenceItem {
    fn from(node: Repetition) -> Self {
        SequenceItem::Repeat(node)
    }
}

impl From<Iteration> for SequenceItem {
    fn from(node: Iteration) -> Self {
        SequenceItem::For(node)
    }
}

impl From<Conditional> for SequenceItem {
    fn from(node: Conditional) -> Self {
        SequenceItem::If(node)
    }
}

impl From<Sequence> for SequenceItem {
    fn from(seq: Sequence) -> Self {
        SequenceItem::Nested(seq)
    }
}

/// Implicitly timed program: entries run back to back in list order.
///
/// Serializes as a bare array; input also accepts `{"items": [...]}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    items: Vec<SequenceItem>,
}

impl Sequence {
    pub fn new() -> Self {
        Sequence::default()
    }

    pub fn push(&mut self, item: impl Into<SequenceItem>) {
        self.items.push(item.into());
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SequenceItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SequenceItem> {
        self.items.iter()
    }
}

impl From<Vec<SequenceItem>> for Sequence {
    fn from(items: Vec<SequenceItem>) -> Self {
        Sequence { items }
    }
}

impl std::ops::Index<usize> for Sequence {
    type Output = SequenceItem;
    fn index(&self, index: usize) -> &SequenceItem {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a SequenceItem;
    type IntoIter = std::slice::Iter<'a, SequenceItem>;
    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for Sequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Sequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            List(Vec<SequenceItem>),
            Record { items: Vec<SequenceItem> },
        }
        let items = match Input::deserialize(deserializer)? {
            Input::List(items) | Input::Record { items } => items,
        };
        Ok(Sequence { items })
    }
}

#[cfg(test)]
mod tests {
    use pulse_units::{Amplitude, Duration};
    use serde_json::json;

    use super::*;
    use crate::operation::Play;
    use crate::types::{ChannelRef, SquarePulse};

    fn play(channel: &str, volts: f64) -> Play {
        Play::new(
            ChannelRef::new(channel).unwrap(),
            SquarePulse::new(Duration::nanos(100).unwrap(), Amplitude::volts(volts)),
        )
    }

    #[test]
    fn serializes_as_a_bare_array() {
        let mut seq = Sequence::new();
        seq.push(play("ch1", 1.0));
        let value = serde_json::to_value(&seq).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[test]
    fn nested_repetition_wire_form() {
        let mut inner = Sequence::new();
        inner.push(play("ch1", 1.0));
        let mut outer = Sequence::new();
        outer.push(Repetition::new(2, inner));
        outer.push(play("ch2", 2.0));

        let value = serde_json::to_value(&outer).unwrap();
        assert_eq!(
            value,
            json!([
                {
                    "op_type": "repeat",
                    "count": 2,
                    "body": [{
                        "op_type": "play",
                        "channel": "ch1",
                        "pulse": {
                            "pulse_type": "square",
                            "duration": {"ns": 100},
                            "amplitude": {"V": 1.0},
                        },
                    }],
                },
                {
                    "op_type": "play",
                    "channel": "ch2",
                    "pulse": {
                        "pulse_type": "square",
                        "duration": {"ns": 100},
                        "amplitude": {"V": 2.0},
                    },
                },
            ])
        );

        let back: Sequence = serde_json::from_value(value).unwrap();
        assert_eq!(back, outer);
        assert!(matches!(back[0], SequenceItem::Repeat(_)));
        assert!(matches!(back[1], SequenceItem::Op(_)));
    }

    #[test]
    fn accepts_the_items_record_form() {
        let bare: Sequence = serde_json::from_value(json!([])).unwrap();
        assert!(bare.is_empty());
        let record: Sequence = serde_json::from_value(json!({
            "items": [{"op_type": "barrier"}],
        }))
        .unwrap();
        assert_eq!(record.len(), 1);
        // Output always normalizes back to the bare array.
        assert!(serde_json::to_value(&record).unwrap().is_array());
    }

    #[test]
    fn nested_sequences_round_trip() {
        let mut inner = Sequence::new();
        inner.push(play("ch1", 1.0));
        let mut outer = Sequence::new();
        outer.push(inner);

        let value = serde_json::to_value(&outer).unwrap();
        assert_eq!(value[0][0]["op_type"], json!("play"));
        // A nested bare array stays a nested sequence, not a leaf.
        let nested: Sequence = serde_json::from_value(json!([[ {
            "op_type": "barrier",
        }]]))
        .unwrap();
        assert!(matches!(nested[0], SequenceItem::Nested(_)));
    }
}
