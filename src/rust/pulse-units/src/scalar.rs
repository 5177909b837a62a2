/// Generates a unit-carrying `f64` quantity: one enum variant per unit, a
/// single-key map wire form, cross-unit comparison in a canonical unit and
/// arithmetic that keeps the left operand's unit.
macro_rules! quantity {
    (
        $(#[$meta:meta])*
        $name:ident, kind = $kind:literal, zero = $zero:ident {
            $(
                $variant:ident { key: $key:literal, factor: $factor:expr, ctor: $ctor:ident, get: $get:ident },
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, serde::Serialize)]
        pub enum $name {
            $( #[serde(rename = $key)] $variant(f64), )+
        }

        impl $name {
            $(
                pub fn $ctor(value: f64) -> Self {
                    $name::$variant(value)
                }
            )+

            $(
                pub fn $get(self) -> f64 {
                    self.canonical() / $factor
                }
            )+

            /// Value in the canonical comparison unit.
            fn canonical(&self) -> f64 {
                match *self {
                    $( $name::$variant(value) => value * $factor, )+
                }
            }

            /// Rebuilds the quantity in `self`'s unit from a canonical value.
            fn with_canonical(&self, value: f64) -> Self {
                match self {
                    $( $name::$variant(_) => $name::$variant(value / $factor), )+
                }
            }

            pub fn is_zero(&self) -> bool {
                self.canonical() == 0.0
            }

            /// Parses a unit-suffixed literal such as `"90deg"` or `"100 mV"`.
            pub fn parse(text: &str) -> crate::Result<Self> {
                let mut units: Vec<(&'static str, fn(f64) -> Self)> =
                    vec![$( ($key, $name::$ctor as fn(f64) -> Self), )+];
                units.sort_by_key(|(key, _)| std::cmp::Reverse(key.len()));
                for (key, build) in units {
                    if let Some((value, _)) = crate::split_suffix(text, &[key]) {
                        let value = value
                            .parse::<f64>()
                            .map_err(|_| crate::UnitError::parse($kind, text))?;
                        return Ok(build(value));
                    }
                }
                Err(crate::UnitError::parse($kind, text))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$zero(0.0)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.canonical() == other.canonical()
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                self.canonical().partial_cmp(&other.canonical())
            }
        }

        impl std::ops::Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                self.with_canonical(self.canonical() + rhs.canonical())
            }
        }

        impl std::ops::Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                self.with_canonical(self.canonical() - rhs.canonical())
            }
        }

        impl std::ops::Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                self.with_canonical(-self.canonical())
            }
        }

        impl std::ops::Mul<f64> for $name {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                self.with_canonical(self.canonical() * rhs)
            }
        }

        impl std::ops::Div<f64> for $name {
            type Output = Self;
            fn div(self, rhs: f64) -> Self {
                self.with_canonical(self.canonical() / rhs)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match *self {
                    $( $name::$variant(value) => write!(f, "{} {}", value, $key), )+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::UnitError;
            fn from_str(text: &str) -> Result<Self, Self::Err> {
                Self::parse(text)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                #[derive(serde::Deserialize)]
                enum Tagged {
                    $( #[serde(rename = $key)] $variant(f64), )+
                }
                #[derive(serde::Deserialize)]
                #[serde(untagged)]
                enum Input {
                    Map(Tagged),
                    Number(f64),
                    Text(String),
                }
                match Input::deserialize(deserializer)? {
                    Input::Map(tagged) => Ok(match tagged {
                        $( Tagged::$variant(value) => $name::$variant(value), )+
                    }),
                    Input::Number(value) if value == 0.0 => Ok($name::$zero(0.0)),
                    Input::Number(value) => Err(serde::de::Error::custom(format!(
                        "bare number {value} is not a valid {}; use a unit-keyed map or the literal 0",
                        $kind
                    ))),
                    Input::Text(text) => Self::parse(&text).map_err(serde::de::Error::custom),
                }
            }
        }
    };
}

pub(crate) use quantity;
