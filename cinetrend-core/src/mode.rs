//! Runtime mode selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which catalog and which search-count store a process wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// TMDB catalog, file-backed counts, remote trending service
    #[default]
    Production,
    /// Offline demo catalog, counts held in memory
    Development,
}

impl RuntimeMode {
    /// Checks if running against the real catalog and durable counts.
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Checks if the catalog client needs a bearer token in this mode.
    pub fn requires_catalog_token(self) -> bool {
        self.is_production()
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Production => "production",
            Self::Development => "development",
        })
    }
}

impl FromStr for RuntimeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" | "demo" => Ok(Self::Development),
            other => Err(format!(
                "unknown runtime mode '{other}', expected production or development"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runtime_mode() {
        assert_eq!("prod".parse::<RuntimeMode>(), Ok(RuntimeMode::Production));
        assert_eq!(" DEMO ".parse::<RuntimeMode>(), Ok(RuntimeMode::Development));
        assert!("staging".parse::<RuntimeMode>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_parse() {
        for mode in [RuntimeMode::Production, RuntimeMode::Development] {
            assert_eq!(mode.to_string().parse::<RuntimeMode>(), Ok(mode));
        }
    }

    #[test]
    fn test_only_production_needs_token() {
        assert!(RuntimeMode::default().requires_catalog_token());
        assert!(!RuntimeMode::Development.requires_catalog_token());
    }
}
