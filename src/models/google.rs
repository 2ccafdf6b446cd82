//! Google Gemini model definitions.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Google Gemini models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
pub enum GoogleModel {
    #[strum(serialize = "gemini-2.5-pro")]
    Gemini25Pro,
    #[strum(serialize = "gemini-2.5-flash")]
    Gemini25Flash,
    #[strum(serialize = "gemini-2.5-flash-lite")]
    Gemini25FlashLite,
    #[strum(serialize = "gemini-2.0-flash")]
    Gemini20Flash,
    /// Custom/unknown Google model.
    #[strum(default)]
    Custom(String),
}

impl GoogleModel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Gemini25Pro => "gemini-2.5-pro",
            Self::Gemini25Flash => "gemini-2.5-flash",
            Self::Gemini25FlashLite => "gemini-2.5-flash-lite",
            Self::Gemini20Flash => "gemini-2.0-flash",
            Self::Custom(s) => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_parse_to_variants() {
        let model: GoogleModel = "gemini-2.0-flash".parse().unwrap();
        assert_eq!(model, GoogleModel::Gemini20Flash);
        assert_eq!(model.as_str(), "gemini-2.0-flash");
    }

    #[test]
    fn unknown_ids_become_custom() {
        let model: GoogleModel = "gemini-experimental".parse().unwrap();
        assert_eq!(model, GoogleModel::Custom("gemini-experimental".into()));
        assert_eq!(model.as_str(), "gemini-experimental");
    }
}
