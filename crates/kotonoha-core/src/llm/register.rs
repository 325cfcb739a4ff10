//! Politeness registers

use crate::error::KotonohaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Target politeness register of a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetRegister {
    /// Plain, friendly speech (タメ口)
    Casual,
    /// Standard です・ます style
    #[default]
    Normal,
    /// Honorific and humble keigo
    Polite,
}

impl TargetRegister {
    pub const ALL: [TargetRegister; 3] = [Self::Casual, Self::Normal, Self::Polite];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Normal => "normal",
            Self::Polite => "polite",
        }
    }

    /// Parse a register name, falling back to `Normal` for anything unrecognized
    pub fn from_name_or_normal(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            warn!(register = name, "unrecognized register, using normal");
            Self::Normal
        })
    }
}

impl FromStr for TargetRegister {
    type Err = KotonohaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "casual" => Ok(Self::Casual),
            "normal" => Ok(Self::Normal),
            "polite" => Ok(Self::Polite),
            other => Err(KotonohaError::invalid_input_field(
                format!("Unknown register '{}', expected casual, normal or polite", other),
                "target_register",
            )),
        }
    }
}

impl fmt::Display for TargetRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_parse_accepts_known_names_only() {
        assert_eq!("Polite".parse::<TargetRegister>().unwrap(), TargetRegister::Polite);
        assert_eq!(" casual ".parse::<TargetRegister>().unwrap(), TargetRegister::Casual);
        assert!("keigo".parse::<TargetRegister>().is_err());
    }

    #[test]
    fn unknown_register_names_the_request_field() {
        let err = "keigo".parse::<TargetRegister>().unwrap_err();
        assert!(
            matches!(&err, KotonohaError::InvalidInput { field: Some(f), .. } if f == "target_register"),
            "{err:?}"
        );
    }

    #[test]
    fn lenient_parse_falls_back_to_normal() {
        assert_eq!(TargetRegister::from_name_or_normal("keigo"), TargetRegister::Normal);
        assert_eq!(TargetRegister::from_name_or_normal(""), TargetRegister::Normal);
        assert_eq!(TargetRegister::from_name_or_normal("casual"), TargetRegister::Casual);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TargetRegister::Polite).unwrap(), "\"polite\"");
    }
}
