use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{Error, Result};

/// Validated name: an ASCII letter or underscore followed by ASCII
/// letters, digits or underscores. Serializes as a bare string.
///
/// The accepted alphabet is deliberately ASCII-only; names written in
/// other scripts are rejected on input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if Self::is_valid(&name) {
            Ok(Identifier(name))
        } else {
            Err(Error::InvalidIdentifier(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => return false,
        }
        chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl FromStr for Identifier {
    type Err = Error;
    fn from_str(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = Error;
    fn try_from(name: &str) -> Result<Self> {
        Self::new(name)
    }
}

impl TryFrom<String> for Identifier {
    type Error = Error;
    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Identifier::new(name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_identifier_syntax() {
        assert!(Identifier::new("ch1").is_ok());
        assert!(Identifier::new("_private").is_ok());
        assert!(Identifier::new("q0_drive").is_ok());
    }

    #[test]
    fn rejects_invalid_names() {
        for bad in ["", "1abc", "with space", "a-b", "ümlaut"] {
            assert!(Identifier::new(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn serializes_as_bare_string() {
        let id = Identifier::new("ch1").unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("ch1"));
        assert!(serde_json::from_value::<Identifier>(serde_json::json!("2ch")).is_err());
    }
}
