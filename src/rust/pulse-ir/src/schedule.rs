use pulse_units::RelTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::control_flow::{ConditionalBase, IterationBase, RepetitionBase};
use crate::operation::Operation;

/// Fixed-count loop over a schedule body.
pub type SchedRepetition = RepetitionBase<Schedule>;
/// Variable-binding loop over a schedule body.
pub type SchedIteration = IterationBase<Schedule>;
/// Conditionally executed schedule body.
pub type SchedConditional = ConditionalBase<Schedule>;

/// Anchor point on an operation's time extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefPt {
    Start,
    End,
    Center,
}

/// Payload of a [`ScheduledOperation`]: a leaf operation, a control-flow
/// node or a nested schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schedulable {
    Op(Operation),
    Repeat(SchedRepetition),
    For(SchedIteration),
    If(SchedConditional),
    Nested(Schedule),
}

impl From<Operation> for Schedulable {
    fn from(op: Operation) -> Self {
        Schedulable::Op(op)
    }
}

macro_rules! impl_from_leaf {
    ($($leaf:ident),+ $(,)?) => {
        $(
            impl From<crate::operation::$leaf> for Schedulable {
                fn from(op: crate::operation::$leaf) -> Self {
                    Schedulable::Op(op.into())
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

impl From<SchedRepetition> for Schedulable {
    fn from(node: SchedRepetition) -> Self {
        Schedulable::Repeat(node)
    }
}

impl From<SchedIteration> for Schedulable {
    fn from(node: SchedIteration) -> Self {
        Schedulable::For(node)
    }
}

impl From<SchedConditional> for Schedulable {
    fn from(node: SchedConditional) -> Self {
        Schedulable::If(node)
    }
}

impl From<Schedule> for Schedulable {
    fn from(schedule: Schedule) -> Self {
        Schedulable::Nested(schedule)
    }
}

/// An operation plus its placement in time.
///
/// The start point is `rel_time` after the anchor: `ref_pt` on the
/// operation named `ref_op` (the previous entry when unset), attached at
/// `ref_pt_new` of the new operation. An omitted `rel_time` means
/// scheduler-chosen placement and is distinct from an explicit zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rel_time: Option<RelTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_op: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_pt: Option<RefPt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_pt_new: Option<RefPt>,
    pub op: Schedulable,
}

impl ScheduledOperation {
    pub fn new(op: impl Into<Schedulable>) -> Self {
        ScheduledOperation {
            name: None,
            rel_time: None,
            ref_op: None,
            ref_pt: None,
            ref_pt_new: None,
            op: op.into(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn rel_time(mut self, rel_time: RelTime) -> Self {
        self.rel_time = Some(rel_time);
        self
    }

    pub fn ref_op(mut self, ref_op: impl Into<String>) -> Self {
        self.ref_op = Some(ref_op.into());
        self
    }

    pub fn ref_pt(mut self, ref_pt: RefPt) -> Self {
        self.ref_pt = Some(ref_pt);
        self
    }

    pub fn ref_pt_new(mut self, ref_pt_new: RefPt) -> Self {
        self.ref_pt_new = Some(ref_pt_new);
        self
    }
}

/// Explicitly timed program: a list of timed operations.
///
/// Serializes as a bare array; input also accepts `{"items": [...]}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schedule {
    items: Vec<ScheduledOperation>,
}

impl Schedule {
    pub fn new() -> Self {
        Schedule::default()
    }

    /// Appends a timed operation and returns a reference to the stored
    /// entry.
    pub fn add_op(&mut self, item: ScheduledOperation) -> &ScheduledOperation {
        self.items.push(item);
        match self.items.last() {
            Some(item) => item,
            None => unreachable!("push always leaves a last element"),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScheduledOperation> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScheduledOperation> {
        self.items.iter()
    }
}

impl From<Vec<ScheduledOperation>> for Schedule {
    fn from(items: Vec<ScheduledOperation>) -> Self {
        Schedule { items }
    }
}

impl std::ops::Index<usize> for Schedule {
    type Output = ScheduledOperation;
    fn index(&self, index: usize) -> &ScheduledOperation {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = &'a ScheduledOperation;
    type IntoIter = std::slice::Iter<'a, ScheduledOperation>;
    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            List(Vec<ScheduledOperation>),
            Record { items: Vec<ScheduledOperation> },
        }
        let items = match Input::deserialize(deserializer)? {
            Input::List(items) | Input::Record { items } => items,
        };
        Ok(Schedule { items })
    }
}

#[cfg(test)]
mod tests {
    use pulse_units::{Amplitude, Duration, Time};
    use serde_json::json;

    use super::*;
    use crate::operation::Play;
    use crate::types::{ChannelRef, SquarePulse};

    fn play(channel: &str) -> Play {
        Play::new(
            ChannelRef::new(channel).unwrap(),
            SquarePulse::new(Duration::nanos(100).unwrap(), Amplitude::volts(1.0)),
        )
    }

    #[test]
    fn wrapper_omits_unset_timing_fields() {
        let mut schedule = Schedule::new();
        schedule.add_op(ScheduledOperation::new(play("ch1")).name("first"));
        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value[0]["name"], json!("first"));
        assert!(value[0].get("rel_time").is_none());
        assert!(value[0].get("ref_op").is_none());
        assert_eq!(value[0]["op"]["op_type"], json!("play"));
    }

    #[test]
    fn explicit_zero_rel_time_is_preserved() {
        // The model keeps an explicit zero; only the builder collapses it.
        let timed = ScheduledOperation::new(play("ch1")).rel_time(Time::nanos(0));
        let value = serde_json::to_value(&timed).unwrap();
        assert_eq!(value["rel_time"], json!({"ns": 0}));
    }

    #[test]
    fn full_wrapper_round_trip() {
        let timed = ScheduledOperation::new(play("ch1"))
            .name("probe")
            .rel_time(Time::nanos(30))
            .ref_op("warmup")
            .ref_pt(RefPt::End)
            .ref_pt_new(RefPt::Start);
        let value = serde_json::to_value(&timed).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "probe",
                "rel_time": {"ns": 30},
                "ref_op": "warmup",
                "ref_pt": "end",
                "ref_pt_new": "start",
                "op": {
                    "op_type": "play",
                    "channel": "ch1",
                    "pulse": {
                        "pulse_type": "square",
                        "duration": {"ns": 100},
                        "amplitude": {"V": 1.0},
                    },
                },
            })
        );
        let back: ScheduledOperation = serde_json::from_value(value).unwrap();
        assert_eq!(back, timed);
    }

    #[test]
    fn accepts_the_items_record_form() {
        let record: Schedule = serde_json::from_value(json!({
            "items": [{"op": {"op_type": "barrier"}}],
        }))
        .unwrap();
        assert_eq!(record.len(), 1);
        assert!(serde_json::to_value(&record).unwrap().is_array());
    }

    #[test]
    fn nested_control_flow_round_trips() {
        let mut inner = Schedule::new();
        inner.add_op(ScheduledOperation::new(play("ch1")));
        let mut schedule = Schedule::new();
        schedule.add_op(ScheduledOperation::new(SchedRepetition::new(5, inner)));

        let value = serde_json::to_value(&schedule).unwrap();
        assert_eq!(value[0]["op"]["op_type"], json!("repeat"));
        assert_eq!(value[0]["op"]["count"], json!(5));
        let back: Schedule = serde_json::from_value(value).unwrap();
        assert_eq!(back, schedule);
        assert!(matches!(back[0].op, Schedulable::Repeat(_)));
    }
}
