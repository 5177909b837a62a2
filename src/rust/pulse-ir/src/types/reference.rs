use super::Identifier;

/// Declares a named-reference newtype over [`Identifier`]. References
/// serialize as bare strings and compare against plain `&str` names.
macro_rules! reference_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Identifier);

        impl $name {
            pub fn new(name: impl Into<String>) -> crate::Result<Self> {
                Ok($name(Identifier::new(name)?))
            }

            pub fn name(&self) -> &str {
                self.0.as_str()
            }
        }

        impl From<Identifier> for $name {
            fn from(id: Identifier) -> Self {
                $name(id)
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == **other
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;
            fn from_str(name: &str) -> crate::Result<Self> {
                Self::new(name)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = crate::Error;
            fn try_from(name: &str) -> crate::Result<Self> {
                Self::new(name)
            }
        }
    };
}

reference_type! {
    /// Reference to a declared variable.
    VariableRef
}

reference_type! {
    /// Reference to a control or readout channel.
    ChannelRef
}

reference_type! {
    /// Reference to a pulse declared with `pulse_decl`.
    PulseRef
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_form_is_a_bare_string() {
        let ch = ChannelRef::new("ch1").unwrap();
        assert_eq!(serde_json::to_value(&ch).unwrap(), serde_json::json!("ch1"));
        let back: ChannelRef = serde_json::from_value(serde_json::json!("ch1")).unwrap();
        assert_eq!(back, ch);
    }

    #[test]
    fn compares_against_plain_names() {
        let var = VariableRef::new("flag").unwrap();
        assert_eq!(var, "flag");
        assert_ne!(var, "other");
    }

    #[test]
    fn validates_on_input() {
        assert!(PulseRef::new("pi half").is_err());
        assert!(serde_json::from_value::<VariableRef>(serde_json::json!("2x")).is_err());
    }
}
