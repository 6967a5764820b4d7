//! Shopify API version definitions.
//!
//! The relay never calls the Admin API itself, but the version is part of the
//! app configuration the operator copies alongside the token, so it is parsed,
//! validated and logged at startup.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// Shopify API version.
///
/// Shopify releases new API versions quarterly (January, April, July, October).
///
/// # Example
///
/// ```rust
/// use token_relay::ApiVersion;
///
/// let version: ApiVersion = "2024-10".parse().unwrap();
/// assert_eq!(version, ApiVersion::V2024_10);
/// assert_eq!(format!("{}", ApiVersion::V2024_10), "2024-10");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// API version 2024-10 (October 2024)
    V2024_10,
    /// API version 2025-01 (January 2025)
    V2025_01,
    /// API version 2025-04 (April 2025)
    V2025_04,
    /// API version 2025-07 (July 2025)
    V2025_07,
    /// API version 2025-10 (October 2025)
    V2025_10,
    /// Unstable API version for development and testing.
    Unstable,
    /// Custom version string for future or unrecognized versions.
    Custom(String),
}

impl ApiVersion {
    /// Returns the version the relay is pinned to when none is configured.
    #[must_use]
    pub const fn pinned() -> Self {
        Self::V2024_10
    }

    fn is_valid_version_format(s: &str) -> bool {
        let Some((year, month)) = s.split_once('-') else {
            return false;
        };

        year.len() == 4
            && year.chars().all(|c| c.is_ascii_digit())
            && matches!(month, "01" | "04" | "07" | "10")
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        Self::pinned()
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version_str = match self {
            Self::V2024_10 => "2024-10",
            Self::V2025_01 => "2025-01",
            Self::V2025_04 => "2025-04",
            Self::V2025_07 => "2025-07",
            Self::V2025_10 => "2025-10",
            Self::Unstable => "unstable",
            Self::Custom(s) => s,
        };
        f.write_str(version_str)
    }
}

impl FromStr for ApiVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        match s.as_str() {
            "2024-10" => Ok(Self::V2024_10),
            "2025-01" => Ok(Self::V2025_01),
            "2025-04" => Ok(Self::V2025_04),
            "2025-07" => Ok(Self::V2025_07),
            "2025-10" => Ok(Self::V2025_10),
            "unstable" => Ok(Self::Unstable),
            _ => {
                if Self::is_valid_version_format(&s) {
                    Ok(Self::Custom(s))
                } else {
                    Err(ConfigError::InvalidApiVersion { version: s })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_parses_known_versions() {
        assert_eq!("2024-10".parse::<ApiVersion>().unwrap(), ApiVersion::V2024_10);
        assert_eq!("2025-10".parse::<ApiVersion>().unwrap(), ApiVersion::V2025_10);
        assert_eq!("unstable".parse::<ApiVersion>().unwrap(), ApiVersion::Unstable);
    }

    #[test]
    fn test_api_version_default_is_pinned() {
        assert_eq!(ApiVersion::default(), ApiVersion::V2024_10);
        assert_eq!(ApiVersion::pinned(), ApiVersion::V2024_10);
    }

    #[test]
    fn test_api_version_parses_future_versions() {
        let version: ApiVersion = "2026-01".parse().unwrap();
        assert_eq!(version, ApiVersion::Custom("2026-01".to_string()));
        assert_eq!(version.to_string(), "2026-01");
    }

    #[test]
    fn test_api_version_rejects_invalid_format() {
        assert!("2024-02".parse::<ApiVersion>().is_err());
        assert!("latest".parse::<ApiVersion>().is_err());
        assert!("24-10".parse::<ApiVersion>().is_err());
    }
}
