use crate::scalar::quantity;

quantity! {
    /// Rotation angle; compared in turns, so `{"deg": 90}` equals
    /// `{"turns": 0.25}`.
    Angle, kind = "angle", zero = degrees {
        Degrees { key: "deg", factor: 1.0 / 360.0, ctor: degrees, get: to_degrees },
        Radians { key: "rad", factor: 1.0 / (2.0 * std::f64::consts::PI), ctor: radians, get: to_radians },
        Turns { key: "turns", factor: 1.0, ctor: turns, get: to_turns },
        HalfTurns { key: "half_turns", factor: 0.5, ctor: half_turns, get: to_half_turns },
    }
}

/// Phase of a carrier or demodulator.
pub type Phase = Angle;
