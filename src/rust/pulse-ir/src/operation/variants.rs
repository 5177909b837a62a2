use pulse_units::{Complex, Duration, Frequency, Magnitude, Phase, Threshold};
use serde::{Deserialize, Serialize};

use crate::types::{
    ChannelRef, Identifier, Integration, PulseOrRef, PulseType, ValueOrVar, VariableRef,
    is_default,
};

/// Amplitude scaling for a played pulse: real, complex or a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmplitudeScale {
    Real(f64),
    Complex(Complex),
    Var(VariableRef),
}

impl From<f64> for AmplitudeScale {
    fn from(value: f64) -> Self {
        AmplitudeScale::Real(value)
    }
}

impl From<Complex> for AmplitudeScale {
    fn from(value: Complex) -> Self {
        AmplitudeScale::Complex(value)
    }
}

impl From<VariableRef> for AmplitudeScale {
    fn from(var: VariableRef) -> Self {
        AmplitudeScale::Var(var)
    }
}

/// Play a pulse on a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Play {
    pub channel: ChannelRef,
    pub pulse: PulseOrRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_amp: Option<AmplitudeScale>,
    /// Condition variable gating whether the pulse is played.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cond: Option<VariableRef>,
}

/// Idle for a fixed duration on one or more channels.
///
/// Each channel starts its wait as soon as it is able to; relative timing
/// between the channels is not guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wait {
    pub channels: Vec<ChannelRef>,
    pub duration: Duration,
}

/// Synchronize channels: each one blocks until all have arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Barrier {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<ChannelRef>,
}

/// Set the carrier frequency of a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetFrequency {
    pub channel: ChannelRef,
    pub frequency: ValueOrVar<Frequency>,
}

/// Add an offset to the carrier frequency of a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftFrequency {
    pub channel: ChannelRef,
    pub frequency: ValueOrVar<Frequency>,
}

/// Set the carrier phase of a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPhase {
    pub channel: ChannelRef,
    pub phase: ValueOrVar<Phase>,
}

/// Add an offset to the carrier phase of a channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftPhase {
    pub channel: ChannelRef,
    pub phase: ValueOrVar<Phase>,
}

/// Integrate the channel signal into a scalar variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub channel: ChannelRef,
    pub var: VariableRef,
    pub duration: Duration,
    pub integration: Integration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_flight: Option<Duration>,
}

/// Continuously record the channel signal into an array variable. The
/// array length determines the number of records within `duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub channel: ChannelRef,
    pub var: VariableRef,
    pub duration: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<Integration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_flight: Option<Duration>,
}

/// Play a DC compensation pulse sized to zero the channel's accumulated
/// area since the last reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompensateDc {
    pub channel: ChannelRef,
    /// `None` resets the accumulator without playing anything. Always
    /// serialized, distinguishing an explicit `null` from omission.
    pub duration: Option<ValueOrVar<Duration>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_amp: Option<Magnitude>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rise_time: Option<ValueOrVar<Duration>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fall_time: Option<ValueOrVar<Duration>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableDType {
    Bool,
    Int,
    Float,
    Complex,
}

/// Declare a variable, scoped to the surrounding context and its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: Identifier,
    pub dtype: VariableDType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Declare a named pulse, scoped to the surrounding context and its
/// children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseDecl {
    pub name: Identifier,
    pub pulse: PulseType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Comparison {
    #[default]
    #[serde(rename = ">=")]
    GreaterEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "<=")]
    LessEqual,
    #[serde(rename = "<")]
    Less,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Real,
    Imag,
    Abs,
    Phase,
}

/// Turn a recorded complex value into a boolean by projecting, rotating
/// and comparing against a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discriminate {
    pub target: VariableRef,
    pub source: VariableRef,
    pub threshold: Threshold,
    #[serde(default, skip_serializing_if = "is_default")]
    pub rotation: Phase,
    #[serde(default, skip_serializing_if = "is_default")]
    pub compare: Comparison,
    #[serde(default, skip_serializing_if = "is_default")]
    pub project: Projection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Last,
    Average,
    Count,
    Trace,
}

/// Publish a variable under a result key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub key: String,
    pub source: VariableRef,
    pub mode: StoreMode,
}

/// Leaf operation, tagged `op_type` on the wire. The set is closed; both
/// program flavors share it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op_type", rename_all = "snake_case")]
pub enum Operation {
    Play(Play),
    Wait(Wait),
    Barrier(Barrier),
    SetFrequency(SetFrequency),
    ShiftFrequency(ShiftFrequency),
    SetPhase(SetPhase),
    ShiftPhase(ShiftPhase),
    Record(Record),
    Trace(Trace),
    #[serde(rename = "dc_comp")]
    CompensateDc(CompensateDc),
    #[serde(rename = "var_decl")]
    VariableDecl(VariableDecl),
    PulseDecl(PulseDecl),
    Discriminate(Discriminate),
    Store(Store),
}

impl Operation {
    /// Channels the operation touches, in field order. Data operations
    /// touch none.
    pub fn channels(&self) -> Vec<&ChannelRef> {
        match self {
            Operation::Play(op) => vec![&op.channel],
            Operation::Wait(op) => op.channels.iter().collect(),
            Operation::Barrier(op) => op.channels.iter().collect(),
            Operation::SetFrequency(op) => vec![&op.channel],
            Operation::ShiftFrequency(op) => vec![&op.channel],
            Operation::SetPhase(op) => vec![&op.channel],
            Operation::ShiftPhase(op) => vec![&op.channel],
            Operation::Record(op) => vec![&op.channel],
            Operation::Trace(op) => vec![&op.channel],
            Operation::CompensateDc(op) => vec![&op.channel],
            Operation::VariableDecl(_)
            | Operation::PulseDecl(_)
            | Operation::Discriminate(_)
            | Operation::Store(_) => Vec::new(),
        }
    }

    /// Wire discriminator of this operation.
    pub fn op_type(&self) -> &'static str {
        match self {
            Operation::Play(_) => "play",
            Operation::Wait(_) => "wait",
            Operation::Barrier(_) => "barrier",
            Operation::SetFrequency(_) => "set_frequency",
            Operation::ShiftFrequency(_) => "shift_frequency",
            Operation::SetPhase(_) => "set_phase",
            Operation::ShiftPhase(_) => "shift_phase",
            Operation::Record(_) => "record",
            Operation::Trace(_) => "trace",
            Operation::CompensateDc(_) => "dc_comp",
            Operation::VariableDecl(_) => "var_decl",
            Operation::PulseDecl(_) => "pulse_decl",
            Operation::Discriminate(_) => "discriminate",
            Operation::Store(_) => "store",
        }
    }
}

macro_rules! impl_from_op {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Operation {
                fn from(op: $variant) -> Self {
                    Operation::$variant(op)
                }
            }
        )+
    };
}

impl_from_op!(
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
