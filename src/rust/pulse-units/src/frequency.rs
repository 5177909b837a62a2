use crate::scalar::quantity;

quantity! {
    /// Oscillator or carrier frequency; compared in Hz.
    Frequency, kind = "frequency", zero = hertz {
        Hertz { key: "Hz", factor: 1.0, ctor: hertz, get: hz },
        Kilohertz { key: "kHz", factor: 1e3, ctor: kilohertz, get: khz },
        Megahertz { key: "MHz", factor: 1e6, ctor: megahertz, get: mhz },
        Gigahertz { key: "GHz", factor: 1e9, ctor: gigahertz, get: ghz },
    }
}
