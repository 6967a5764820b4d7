//! Environment loading for the relay binary.
//!
//! [`EnvConfig::from_env`] reads the process environment (after an optional
//! `.env` file has been applied by the binary). Missing API credentials are not
//! fatal here; they surface as a configuration error when a merchant first hits
//! the authorization endpoint. Malformed values (scopes, port, API version,
//! host) fail at load.
//!
//! ## Env Reads
//!
//! | Variable | Default |
//! |---|---|
//! | `SHOPIFY_API_KEY` | unset |
//! | `SHOPIFY_API_SECRET` | unset |
//! | `SHOPIFY_OLD_API_SECRET` | unset |
//! | `SHOPIFY_API_SCOPES` | empty |
//! | `SHOPIFY_API_VERSION` | `2024-10` |
//! | `HOST` | unset, falls back to `SHOPIFY_APP_URL` |
//! | `HOST_SCHEME` | `https` |
//! | `PORT` | `3000` |
//! | `APP_NAME` | `Meezy` |
//! | `TOKEN_LOOKUP_ENABLED` | `true` |

use crate::auth::AuthScopes;
use crate::config::{ApiKey, ApiSecretKey, ApiVersion, HostName, ShopifyConfig};
use crate::error::ConfigError;
use tracing::{info, warn};

pub const SHOPIFY_API_KEY: &str = "SHOPIFY_API_KEY";
pub const SHOPIFY_API_SECRET: &str = "SHOPIFY_API_SECRET";
pub const SHOPIFY_OLD_API_SECRET: &str = "SHOPIFY_OLD_API_SECRET";
pub const SHOPIFY_API_SCOPES: &str = "SHOPIFY_API_SCOPES";
pub const SHOPIFY_API_VERSION: &str = "SHOPIFY_API_VERSION";
pub const HOST: &str = "HOST";
pub const SHOPIFY_APP_URL: &str = "SHOPIFY_APP_URL";
pub const HOST_SCHEME: &str = "HOST_SCHEME";
pub const PORT: &str = "PORT";
pub const APP_NAME: &str = "APP_NAME";
pub const TOKEN_LOOKUP_ENABLED: &str = "TOKEN_LOOKUP_ENABLED";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_APP_NAME: &str = "Meezy";
const BIND_ALL: &str = "0.0.0.0";

/// Strips a leading `http://` or `https://` and every trailing `/`.
///
/// ```rust
/// use token_relay::config::normalize_host;
///
/// assert_eq!(normalize_host("https://example.com/"), "example.com");
/// assert_eq!(normalize_host("http://localhost:3000//"), "localhost:3000");
/// ```
#[must_use]
pub fn normalize_host(raw: &str) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();

    let without_scheme = if lower.starts_with("https://") {
        &trimmed["https://".len()..]
    } else if lower.starts_with("http://") {
        &trimmed["http://".len()..]
    } else {
        trimmed
    };

    without_scheme.trim_end_matches('/').to_string()
}

fn is_bind_all(host: &str) -> bool {
    let without_port = host.split(':').next().unwrap_or(host);
    without_port == BIND_ALL
}

fn usable_host(raw: Option<&str>) -> Option<String> {
    raw.map(normalize_host)
        .filter(|host| !host.is_empty() && !is_bind_all(host))
}

/// Resolves the public host name from the primary and secondary values.
///
/// Both values are normalized with [`normalize_host`]. A primary that is
/// empty or the bind-all address is treated as absent. The result is empty
/// when neither value is usable.
///
/// ```rust
/// use token_relay::config::resolve_host;
///
/// assert_eq!(resolve_host(Some("https://meezy.example.com/"), None), "meezy.example.com");
/// assert_eq!(resolve_host(Some("0.0.0.0"), Some("https://app.example.com")), "app.example.com");
/// assert_eq!(resolve_host(Some("0.0.0.0"), None), "");
/// ```
#[must_use]
pub fn resolve_host(primary: Option<&str>, secondary: Option<&str>) -> String {
    usable_host(primary)
        .or_else(|| usable_host(secondary))
        .unwrap_or_default()
}

/// Everything the relay reads from its environment.
#[derive(Clone, Debug)]
pub struct EnvConfig {
    pub api_key: Option<ApiKey>,
    pub api_secret_key: Option<ApiSecretKey>,
    pub old_api_secret_key: Option<ApiSecretKey>,
    pub scopes: AuthScopes,
    pub api_version: ApiVersion,
    /// Normalized public host, `None` when no usable value was configured.
    pub host_name: Option<HostName>,
    pub host_scheme: String,
    pub port: u16,
    pub app_name: String,
    /// Whether `GET /?shop=` may display a stored token.
    pub token_lookup_enabled: bool,
}

impl EnvConfig {
    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any value that is present cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any value that is present cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = get(SHOPIFY_API_KEY).map(ApiKey::new).transpose()?;
        let api_secret_key = get(SHOPIFY_API_SECRET).map(ApiSecretKey::new).transpose()?;
        let old_api_secret_key = get(SHOPIFY_OLD_API_SECRET)
            .map(ApiSecretKey::new)
            .transpose()?;

        let scopes = match get(SHOPIFY_API_SCOPES) {
            Some(raw) => raw.parse()?,
            None => AuthScopes::new(),
        };

        let api_version = match get(SHOPIFY_API_VERSION) {
            Some(raw) => raw.parse()?,
            None => ApiVersion::default(),
        };

        let host = resolve_host(get(HOST).as_deref(), get(SHOPIFY_APP_URL).as_deref());
        let host_name = if host.is_empty() {
            None
        } else {
            Some(HostName::new(host)?)
        };

        let host_scheme = match get(HOST_SCHEME) {
            Some(raw) => parse_scheme(&raw)?,
            None => "https".to_string(),
        };

        let port = match get(PORT) {
            Some(raw) => raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidEnvVar {
                    name: PORT,
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_PORT,
        };

        let token_lookup_enabled = match get(TOKEN_LOOKUP_ENABLED) {
            Some(raw) => parse_bool(TOKEN_LOOKUP_ENABLED, &raw)?,
            None => true,
        };

        Ok(Self {
            api_key,
            api_secret_key,
            old_api_secret_key,
            scopes,
            api_version,
            host_name,
            host_scheme,
            port,
            app_name: get(APP_NAME).unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
            token_lookup_enabled,
        })
    }

    /// Builds the validated OAuth configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] when the API key or
    /// secret was not configured.
    pub fn shopify_config(&self) -> Result<ShopifyConfig, ConfigError> {
        let mut builder = ShopifyConfig::builder()
            .scopes(self.scopes.clone())
            .host_scheme(self.host_scheme.clone())
            .api_version(self.api_version.clone());

        if let Some(key) = &self.api_key {
            builder = builder.api_key(key.clone());
        }
        if let Some(secret) = &self.api_secret_key {
            builder = builder.api_secret_key(secret.clone());
        }
        if let Some(old) = &self.old_api_secret_key {
            builder = builder.old_api_secret_key(old.clone());
        }
        if let Some(host) = &self.host_name {
            builder = builder.host_name(host.clone());
        }

        builder.build()
    }

    /// Emits the startup environment check. Secret values are never logged.
    pub fn log_summary(&self) {
        info!(
            api_key = presence(self.api_key.is_some()),
            api_secret = presence(self.api_secret_key.is_some()),
            old_api_secret = presence(self.old_api_secret_key.is_some()),
            host = self.host_name.as_ref().map_or("", AsRef::as_ref),
            scopes = %self.scopes,
            api_version = %self.api_version,
            "Environment check"
        );

        if self.api_key.is_none() || self.api_secret_key.is_none() {
            warn!("Shopify API credentials are incomplete, authorization requests will fail");
        }
        if self.host_name.is_none() {
            warn!("No usable HOST or SHOPIFY_APP_URL configured, authorization requests will fail");
        }
    }
}

const fn presence(present: bool) -> &'static str {
    if present {
        "Present"
    } else {
        "MISSING"
    }
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            name,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn parse_scheme(raw: &str) -> Result<String, ConfigError> {
    let scheme = raw.trim().to_ascii_lowercase();
    if scheme == "http" || scheme == "https" {
        Ok(scheme)
    } else {
        Err(ConfigError::InvalidEnvVar {
            name: HOST_SCHEME,
            reason: format!("expected 'http' or 'https', got '{scheme}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<EnvConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        EnvConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_normalize_host_strips_scheme_and_trailing_slash() {
        assert_eq!(normalize_host("https://example.com/"), "example.com");
        assert_eq!(normalize_host("HTTPS://Example.com"), "Example.com");
        assert_eq!(normalize_host("example.com"), "example.com");
        assert_eq!(normalize_host("  http://example.com///  "), "example.com");
    }

    #[test]
    fn test_bind_all_falls_back() {
        assert_eq!(resolve_host(Some("0.0.0.0"), Some("backup.example.com/")), "backup.example.com");
        assert_eq!(resolve_host(Some("http://0.0.0.0:3000/"), None), "");
        assert_eq!(resolve_host(None, None), "");
        assert_eq!(resolve_host(Some("0.0.0.0"), Some("0.0.0.0")), "");
    }

    #[test]
    fn test_loads_meezy_host() {
        let config = load(&[(HOST, "https://meezy.example.com/")]).unwrap();
        assert_eq!(
            config.host_name.as_ref().map(AsRef::as_ref),
            Some("meezy.example.com")
        );
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = load(&[]).unwrap();
        assert!(config.api_key.is_none());
        assert!(config.api_secret_key.is_none());
        assert!(config.host_name.is_none());
        assert_eq!(config.port, 3000);
        assert_eq!(config.app_name, "Meezy");
        assert_eq!(config.host_scheme, "https");
        assert!(config.token_lookup_enabled);
        assert_eq!(config.api_version, ApiVersion::V2024_10);
    }

    #[test]
    fn test_missing_credentials_fail_only_when_building_shopify_config() {
        let config = load(&[(HOST, "app.example.com")]).unwrap();
        assert!(matches!(
            config.shopify_config(),
            Err(ConfigError::MissingRequiredField { field: "api_key" })
        ));
    }

    #[test]
    fn test_full_environment_builds_shopify_config() {
        let config = load(&[
            (SHOPIFY_API_KEY, "key"),
            (SHOPIFY_API_SECRET, "secret"),
            (SHOPIFY_API_SCOPES, "read_products,write_orders"),
            (HOST, "https://app.example.com"),
            (PORT, "8080"),
            (TOKEN_LOOKUP_ENABLED, "false"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(!config.token_lookup_enabled);

        let shopify = config.shopify_config().unwrap();
        assert_eq!(shopify.api_key().as_ref(), "key");
        assert!(shopify.scopes().iter().any(|s| s == "read_orders"));
        assert_eq!(
            shopify.redirect_uri("/api/auth/callback").as_deref(),
            Some("https://app.example.com/api/auth/callback")
        );
    }

    #[test]
    fn test_malformed_values_are_rejected() {
        assert!(matches!(
            load(&[(PORT, "eighty")]),
            Err(ConfigError::InvalidEnvVar { name: "PORT", .. })
        ));
        assert!(matches!(
            load(&[(SHOPIFY_API_SCOPES, "read products")]),
            Err(ConfigError::InvalidScopes { .. })
        ));
        assert!(load(&[(TOKEN_LOOKUP_ENABLED, "maybe")]).is_err());
        assert!(load(&[(HOST_SCHEME, "ftp")]).is_err());
        assert!(load(&[(HOST, "https://example.com/app")]).is_err());
    }

    #[test]
    fn test_blank_credentials_count_as_missing() {
        let config = load(&[(SHOPIFY_API_KEY, ""), (SHOPIFY_API_SECRET, "  ")]).unwrap();
        assert!(config.api_key.is_none());
        assert!(config.api_secret_key.is_none());
    }
}
