use pulse_units::Phase;
use serde::{Deserialize, Serialize};

/// Readout integration mode, tagged `integration_type` on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "integration_type", rename_all = "snake_case")]
pub enum Integration {
    /// Plain integration over the acquisition window.
    #[default]
    Full,
    /// Demodulation against a reference tone.
    Demod {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phase: Option<Phase>,
        #[serde(default = "one", skip_serializing_if = "is_one")]
        scale_cos: f64,
        #[serde(default = "one", skip_serializing_if = "is_one")]
        scale_sin: f64,
    },
}

impl Integration {
    pub fn demod() -> Self {
        Integration::Demod {
            phase: None,
            scale_cos: 1.0,
            scale_sin: 1.0,
        }
    }
}

fn one() -> f64 {
    1.0
}

fn is_one(value: &f64) -> bool {
    *value == 1.0
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn full_is_a_bare_tag() {
        assert_eq!(
            serde_json::to_value(Integration::Full).unwrap(),
            json!({"integration_type": "full"})
        );
    }

    #[test]
    fn demod_omits_unit_scales() {
        assert_eq!(
            serde_json::to_value(Integration::demod()).unwrap(),
            json!({"integration_type": "demod"})
        );
        let scaled = Integration::Demod {
            phase: Some(Phase::degrees(90.0)),
            scale_cos: 0.5,
            scale_sin: 1.0,
        };
        assert_eq!(
            serde_json::to_value(scaled).unwrap(),
            json!({"integration_type": "demod", "phase": {"deg": 90.0}, "scale_cos": 0.5})
        );
    }

    #[test]
    fn demod_defaults_fill_in_on_input() {
        let parsed: Integration =
            serde_json::from_value(json!({"integration_type": "demod"})).unwrap();
        assert_eq!(parsed, Integration::demod());
    }
}
