use rocket::serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Charging policy of the charger.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(crate = "rocket::serde")]
pub enum ChargeMode {
    #[serde(rename = "grid")]
    Grid,
    #[serde(rename = "solar")]
    Solar,
}

impl ChargeMode {
    pub fn from_charge_from_grid(charge_from_grid: bool) -> Self {
        if charge_from_grid {
            ChargeMode::Grid
        } else {
            ChargeMode::Solar
        }
    }

    pub fn is_grid(self) -> bool {
        self == ChargeMode::Grid
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChargeMode::Grid => "grid",
            ChargeMode::Solar => "solar",
        }
    }
}

impl fmt::Display for ChargeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown charge mode `{}`", self.0)
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for ChargeMode {
    type Err = UnknownMode;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "grid" => Ok(ChargeMode::Grid),
            "solar" => Ok(ChargeMode::Solar),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// Result of asking a backend to switch mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Target already in effect, nothing written.
    Unchanged,
    /// One write was issued and accepted.
    Applied { override_active: bool },
    /// The write was attempted and failed; the failure has been logged.
    WriteFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::serde::json::serde_json;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Grid".parse::<ChargeMode>(), Ok(ChargeMode::Grid));
        assert_eq!(" SOLAR ".parse::<ChargeMode>(), Ok(ChargeMode::Solar));
        assert_eq!(
            "wind".parse::<ChargeMode>(),
            Err(UnknownMode("wind".to_string()))
        );
    }

    #[test]
    fn test_bool_bridge() {
        assert_eq!(ChargeMode::from_charge_from_grid(true), ChargeMode::Grid);
        assert_eq!(ChargeMode::from_charge_from_grid(false), ChargeMode::Solar);
        assert!(ChargeMode::Grid.is_grid());
        assert!(!ChargeMode::Solar.is_grid());
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&ChargeMode::Grid).unwrap(), "\"grid\"");
        let mode: ChargeMode = serde_json::from_str("\"solar\"").unwrap();
        assert_eq!(mode, ChargeMode::Solar);
    }
}
