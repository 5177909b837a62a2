use pulse_units::{Amplitude, Duration, Frequency, Phase};
use serde::{Deserialize, Serialize};

use super::{ArrayValues, PulseRef, ValueOrVar};

/// Rectangular pulse with optional edge shaping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SquarePulse {
    pub duration: ValueOrVar<Duration>,
    pub amplitude: ValueOrVar<Amplitude>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rise_time: Option<ValueOrVar<Duration>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fall_time: Option<ValueOrVar<Duration>>,
}

impl SquarePulse {
    pub fn new(
        duration: impl Into<ValueOrVar<Duration>>,
        amplitude: impl Into<ValueOrVar<Amplitude>>,
    ) -> Self {
        SquarePulse {
            duration: duration.into(),
            amplitude: amplitude.into(),
            rise_time: None,
            fall_time: None,
        }
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

/// Sinusoidal pulse; sweeps from `frequency` to `to_frequency` when the
/// latter is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinePulse {
    pub duration: ValueOrVar<Duration>,
    pub amplitude: ValueOrVar<Amplitude>,
    pub frequency: ValueOrVar<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_frequency: Option<ValueOrVar<Frequency>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<ValueOrVar<Phase>>,
}

impl SinePulse {
    pub fn new(
        duration: impl Into<ValueOrVar<Duration>>,
        amplitude: impl Into<ValueOrVar<Amplitude>>,
        frequency: impl Into<ValueOrVar<Frequency>>,
    ) -> Self {
        SinePulse {
            duration: duration.into(),
            amplitude: amplitude.into(),
            frequency: frequency.into(),
            to_frequency: None,
            phase: None,
        }
    }

    pub fn to_frequency(mut self, to_frequency: impl Into<ValueOrVar<Frequency>>) -> Self {
        self.to_frequency = Some(to_frequency.into());
        self
    }

    pub fn phase(mut self, phase: impl Into<ValueOrVar<Phase>>) -> Self {
        self.phase = Some(phase.into());
        self
    }
}

/// Envelope computed by a named external function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalPulse {
    pub function: String,
    pub duration: ValueOrVar<Duration>,
    pub amplitude: ValueOrVar<Amplitude>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ExternalPulse {
    pub fn new(
        function: impl Into<String>,
        duration: impl Into<ValueOrVar<Duration>>,
        amplitude: impl Into<ValueOrVar<Amplitude>>,
    ) -> Self {
        ExternalPulse {
            function: function.into(),
            duration: duration.into(),
            amplitude: amplitude.into(),
            params: None,
        }
    }

    pub fn params(mut self, params: serde_json::Map<String, serde_json::Value>) -> Self {
        self.params = Some(params);
        self
    }
}

/// Explicitly sampled envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbitraryPulse {
    pub samples: ArrayValues,
    pub duration: ValueOrVar<Duration>,
    pub amplitude: ValueOrVar<Amplitude>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_points: Option<Vec<f64>>,
}

impl ArbitraryPulse {
    pub fn new(
        samples: ArrayValues,
        duration: impl Into<ValueOrVar<Duration>>,
        amplitude: impl Into<ValueOrVar<Amplitude>>,
    ) -> Self {
        ArbitraryPulse {
            samples,
            duration: duration.into(),
            amplitude: amplitude.into(),
            interpolation: None,
            time_points: None,
        }
    }

    pub fn interpolation(mut self, interpolation: impl Into<String>) -> Self {
        self.interpolation = Some(interpolation.into());
        self
    }

    pub fn time_points(mut self, time_points: Vec<f64>) -> Self {
        self.time_points = Some(time_points);
        self
    }
}

/// Pulse envelope, tagged `pulse_type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pulse_type", rename_all = "snake_case")]
pub enum PulseType {
    Square(SquarePulse),
    Sine(SinePulse),
    External(ExternalPulse),
    Arbitrary(ArbitraryPulse),
}

/// Inline pulse definition or a reference to a declared pulse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PulseOrRef {
    Pulse(PulseType),
    Ref(PulseRef),
}

macro_rules! impl_from_pulse {
    ($shape:ty, $variant:ident) => {
        impl From<$shape> for PulseType {
            fn from(pulse: $shape) -> Self {
                PulseType::$variant(pulse)
            }
        }

        impl From<$shape> for PulseOrRef {
            fn from(pulse: $shape) -> Self {
                PulseOrRef::Pulse(PulseType::$variant(pulse))
            }
        }
    };
}

impl_from_pulse!(SquarePulse, Square);
impl_from_pulse!(SinePulse, Sine);
impl_from_pulse!(ExternalPulse, External);
impl_from_pulse!(ArbitraryPulse, Arbitrary);

impl From<PulseType> for PulseOrRef {
    fn from(pulse: PulseType) -> Self {
        PulseOrRef::Pulse(pulse)
    }
}

impl From<PulseRef> for PulseOrRef {
    fn from(name: PulseRef) -> Self {
        PulseOrRef::Ref(name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn square() -> SquarePulse {
        SquarePulse::new(Duration::nanos(100).unwrap(), Amplitude::volts(1.0))
    }

    #[test]
    fn square_pulse_wire_form() {
        assert_eq!(
            serde_json::to_value(square()).unwrap(),
            json!({"duration": {"ns": 100}, "amplitude": {"V": 1.0}})
        );
    }

    #[test]
    fn pulse_type_tag() {
        let tagged = serde_json::to_value(PulseType::from(square())).unwrap();
        assert_eq!(tagged["pulse_type"], json!("square"));
        let back: PulseType = serde_json::from_value(tagged).unwrap();
        assert_eq!(back, PulseType::Square(square()));
    }

    #[test]
    fn optional_edges_are_omitted() {
        let shaped = square().rise_time(Duration::nanos(10).unwrap());
        let value = serde_json::to_value(&shaped).unwrap();
        assert_eq!(value["rise_time"], json!({"ns": 10}));
        assert!(value.get("fall_time").is_none());
    }

    #[test]
    fn pulse_or_ref_resolves_strings_to_refs() {
        let parsed: PulseOrRef = serde_json::from_value(json!("pi_half")).unwrap();
        assert_eq!(parsed, PulseOrRef::Ref(PulseRef::new("pi_half").unwrap()));

        let inline: PulseOrRef = serde_json::from_value(json!({
            "pulse_type": "sine",
            "duration": {"us": 1.0},
            "amplitude": {"mV": 500.0},
            "frequency": {"MHz": 10.0},
        }))
        .unwrap();
        assert!(matches!(inline, PulseOrRef::Pulse(PulseType::Sine(_))));
    }
}
