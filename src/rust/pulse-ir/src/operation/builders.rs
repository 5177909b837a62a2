//! Constructors for leaf operations, chainable in consuming style for the
//! optional fields.

use pulse_units::{Duration, Frequency, Magnitude, Phase, Threshold};

use super::variants::{
    AmplitudeScale, Barrier, Comparison, CompensateDc, Discriminate, Play, Projection, PulseDecl,
    Record, SetFrequency, SetPhase, ShiftFrequency, ShiftPhase, Store, StoreMode, Trace,
    VariableDType, VariableDecl, Wait,
};
use crate::types::{
    ChannelRef, Identifier, Integration, PulseOrRef, PulseType, ValueOrVar, VariableRef,
};

impl Play {
    pub fn new(channel: ChannelRef, pulse: impl Into<PulseOrRef>) -> Self {
        Play {
            channel,
            pulse: pulse.into(),
            scale_amp: None,
            cond: None,
        }
    }

    pub fn scale_amp(mut self, scale: impl Into<AmplitudeScale>) -> Self {
        self.scale_amp = Some(scale.into());
        self
    }

    pub fn cond(mut self, cond: VariableRef) -> Self {
        self.cond = Some(cond);
        self
    }
}

impl Wait {
    pub fn new(channels: Vec<ChannelRef>, duration: Duration) -> Self {
        Wait { channels, duration }
    }
}

impl Barrier {
    pub fn new(channels: Vec<ChannelRef>) -> Self {
        Barrier { channels }
    }

    /// Barrier across every channel of the program.
    pub fn all() -> Self {
        Barrier {
            channels: Vec::new(),
        }
    }
}

impl SetFrequency {
    pub fn new(channel: ChannelRef, frequency: impl Into<ValueOrVar<Frequency>>) -> Self {
        SetFrequency {
            channel,
            frequency: frequency.into(),
        }
    }
}

impl ShiftFrequency {
    pub fn new(channel: ChannelRef, frequency: impl Into<ValueOrVar<Frequency>>) -> Self {
        ShiftFrequency {
            channel,
            frequency: frequency.into(),
        }
    }
}

impl SetPhase {
    pub fn new(channel: ChannelRef, phase: impl Into<ValueOrVar<Phase>>) -> Self {
        SetPhase {
            channel,
            phase: phase.into(),
        }
    }
}

impl ShiftPhase {
    pub fn new(channel: ChannelRef, phase: impl Into<ValueOrVar<Phase>>) -> Self {
        ShiftPhase {
            channel,
            phase: phase.into(),
        }
    }
}

impl Record {
    pub fn new(
        channel: ChannelRef,
        var: VariableRef,
        duration: Duration,
        integration: Integration,
    ) -> Self {
        Record {
            channel,
            var,
            duration,
            integration,
            time_of_flight: None,
        }
    }

    pub fn time_of_flight(mut self, time_of_flight: Duration) -> Self {
        self.time_of_flight = Some(time_of_flight);
        self
    }
}

impl Trace {
    pub fn new(channel: ChannelRef, var: VariableRef, duration: Duration) -> Self {
        Trace {
            channel,
            var,
            duration,
            integration: None,
            time_of_flight: None,
        }
    }

    pub fn integration(mut self, integration: Integration) -> Self {
        self.integration = Some(integration);
        self
    }

    pub fn time_of_flight(mut self, time_of_flight: Duration) -> Self {
        self.time_of_flight = Some(time_of_flight);
        self
    }
}

impl CompensateDc {
    pub fn new(channel: ChannelRef, duration: impl Into<ValueOrVar<Duration>>) -> Self {
        CompensateDc {
            channel,
            duration: Some(duration.into()),
            max_amp: None,
            rise_time: None,
            fall_time: None,
        }
    }

    /// Reset the channel's accumulated area without playing anything.
    pub fn reset(channel: ChannelRef) -> Self {
        CompensateDc {
            channel,
            duration: None,
            max_amp: None,
            rise_time: None,
            fall_time: None,
        }
    }

    pub fn max_amp(mut self, max_amp: Magnitude) -> Self {
        self.max_amp = Some(max_amp);
        self
    }

    pub fn rise_time(mut self, rise_time: impl Into<ValueOrVar<Duration>>) -> Self {
        self.rise_time = Some(rise_time.into());
        self
    }

    pub fn fall_time(mut self, fall_time: impl Into<ValueOrVar<Duration>>) -> Self {
        self.fall_time = Some(fall_time.into());
        self
    }
}

impl VariableDecl {
    pub fn new(name: Identifier, dtype: VariableDType) -> Self {
        VariableDecl {
            name,
            dtype,
            shape: None,
            unit: None,
        }
    }

    pub fn shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

impl PulseDecl {
    pub fn new(name: Identifier, pulse: impl Into<PulseType>) -> Self {
        PulseDecl {
            name,
            pulse: pulse.into(),
        }
    }
}

impl Discriminate {
    pub fn new(target: VariableRef, source: VariableRef, threshold: Threshold) -> Self {
        Discriminate {
            target,
            source,
            threshold,
            rotation: Phase::default(),
            compare: Comparison::default(),
            project: Projection::default(),
        }
    }

    pub fn rotation(mut self, rotation: Phase) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn compare(mut self, compare: Comparison) -> Self {
        self.compare = compare;
        self
    }

    pub fn project(mut self, project: Projection) -> Self {
        self.project = project;
        self
    }
}

impl Store {
    pub fn new(key: impl Into<String>, source: VariableRef, mode: StoreMode) -> Self {
        Store {
            key: key.into(),
            source,
            mode,
        }
    }
}
