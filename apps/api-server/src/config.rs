//! Centralized configuration for api-server.
//!
//! All environment variables are loaded and validated at startup to fail fast
//! on misconfiguration rather than at request time. A `.env` file in the
//! working directory is read first when present.

use axum::http::HeaderValue;
use domain::qr::{LinkSettings, DEFAULT_QR_PROVIDER, DEFAULT_QR_SIZE, DEFAULT_SHORT_DOMAIN};
use domain::Owner;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Storage backend provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageProvider {
    /// In-memory storage (data lost on restart)
    Memory,
    /// SQLite file-based storage
    Sqlite,
}

impl StorageProvider {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("memory") {
            Self::Memory
        } else {
            Self::Sqlite
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

fn required(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    value.filter(|v| !v.trim().is_empty()).ok_or(ConfigError {
        field,
        message: "Required".into(),
    })
}

/// Server configuration loaded from environment variables.
///
/// All fields are validated at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port (default: 3001)
    pub port: u16,
    /// Shared secret every request must present in `X-API-Key`
    pub api_key: String,
    /// Owner used when a request carries no `X-User` header
    pub api_user: Owner,
    /// CORS allow origin
    pub cors_allow_origin: HeaderValue,
    /// Storage provider
    pub storage_provider: StorageProvider,
    /// SQLite database path (when using sqlite storage)
    pub db_path: PathBuf,
    /// Log format
    pub log_format: LogFormat,
    /// Key for the remote shortener service
    pub shortener_api_key: String,
    /// Base URL of the remote shortener service
    pub shortener_base_url: String,
    /// Short domain and QR provider settings
    pub links: LinkSettings,
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// Fails fast on invalid configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`] but reading variables through `get`.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Result<Self, ConfigError> {
        // Port
        let port = match get("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError {
                field: "PORT",
                message: format!("Invalid port '{s}'"),
            })?,
            None => 3001,
        };

        // API access
        let api_key = required("API_KEY", get("API_KEY"))?;
        let api_user = Owner::new(get("API_USER").unwrap_or_else(|| "api".into())).map_err(|_| ConfigError {
            field: "API_USER",
            message: "Must not be blank".into(),
        })?;

        // CORS allow origin
        let cors_origin_str = get("CORS_ALLOW_ORIGIN").unwrap_or_else(|| "*".into());
        let cors_allow_origin = if cors_origin_str == "*" {
            HeaderValue::from_static("*")
        } else {
            HeaderValue::from_str(&cors_origin_str).map_err(|e| ConfigError {
                field: "CORS_ALLOW_ORIGIN",
                message: format!("Invalid header value '{}': {}", cors_origin_str, e),
            })?
        };

        // Storage provider
        let storage_provider =
            StorageProvider::from_str(&get("STORAGE_PROVIDER").unwrap_or_else(|| "sqlite".into()));
        let db_path = PathBuf::from(get("DB_PATH").unwrap_or_else(|| "./data/url_actions.db".into()));

        // Log format
        let log_format = LogFormat::from_str(&get("LOG_FORMAT").unwrap_or_else(|| "pretty".into()));

        // Remote shortener
        let shortener_api_key = required("SHORTENER_API_KEY", get("SHORTENER_API_KEY"))?;
        let shortener_base_url =
            get("SHORTENER_BASE_URL").unwrap_or_else(|| shortener_client::DEFAULT_BASE_URL.into());
        if !(shortener_base_url.starts_with("http://") || shortener_base_url.starts_with("https://")) {
            return Err(ConfigError {
                field: "SHORTENER_BASE_URL",
                message: format!("Must be an http(s) URL, got '{shortener_base_url}'"),
            });
        }

        // Short links and QR images
        let qr_size = match get("QR_SIZE") {
            Some(s) => s.parse::<u32>().ok().filter(|n| *n > 0).ok_or(ConfigError {
                field: "QR_SIZE",
                message: format!("Must be a positive integer, got '{s}'"),
            })?,
            None => DEFAULT_QR_SIZE,
        };
        let links = LinkSettings {
            short_domain: get("SHORT_DOMAIN")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_SHORT_DOMAIN.into()),
            qr_provider: get("QR_PROVIDER")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DEFAULT_QR_PROVIDER.into()),
            qr_size,
        };

        Ok(Self {
            port,
            api_key,
            api_user,
            cors_allow_origin,
            storage_provider,
            db_path,
            log_format,
            shortener_api_key,
            shortener_base_url,
            links,
        })
    }

    /// Log warnings about insecure configuration.
    pub fn warn_if_insecure(&self) {
        if self.storage_provider == StorageProvider::Memory {
            tracing::warn!(
                "STORAGE_PROVIDER=memory: the action log is lost on restart. \
                 DO NOT USE IN PRODUCTION."
            );
        }
        if self.api_key.len() < 16 {
            tracing::warn!("API_KEY is shorter than 16 characters.");
        }
        if self.shortener_base_url.starts_with("http://") {
            tracing::warn!(
                base_url = %self.shortener_base_url,
                "SHORTENER_BASE_URL is not https: the shortener key is sent in clear text."
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    const MINIMAL: [(&str, &str); 2] = [("API_KEY", "local-secret"), ("SHORTENER_API_KEY", "remote")];

    #[test]
    fn storage_provider_parsing() {
        assert_eq!(StorageProvider::from_str("memory"), StorageProvider::Memory);
        assert_eq!(StorageProvider::from_str("MEMORY"), StorageProvider::Memory);
        assert_eq!(StorageProvider::from_str("sqlite"), StorageProvider::Sqlite);
        assert_eq!(StorageProvider::from_str("anything"), StorageProvider::Sqlite);
    }

    #[test]
    fn log_format_parsing() {
        assert_eq!(LogFormat::from_str("pretty"), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("json"), LogFormat::Json);
        assert_eq!(LogFormat::from_str("JSON"), LogFormat::Json);
        assert_eq!(LogFormat::from_str("anything"), LogFormat::Pretty);
    }

    #[test]
    fn defaults_apply() {
        let cfg = load(&MINIMAL).unwrap();
        assert_eq!(cfg.port, 3001);
        assert_eq!(cfg.api_user.as_str(), "api");
        assert_eq!(cfg.storage_provider, StorageProvider::Sqlite);
        assert_eq!(cfg.db_path, PathBuf::from("./data/url_actions.db"));
        assert_eq!(cfg.shortener_base_url, "https://api.aws3.link");
        assert_eq!(cfg.links, LinkSettings::default());
    }

    #[test]
    fn secrets_are_required() {
        let err = load(&[("SHORTENER_API_KEY", "remote")]).unwrap_err();
        assert_eq!(err.field, "API_KEY");
        let err = load(&[("API_KEY", "x"), ("SHORTENER_API_KEY", "  ")]).unwrap_err();
        assert_eq!(err.field, "SHORTENER_API_KEY");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("PORT", "http"));
        assert_eq!(load(&vars).unwrap_err().field, "PORT");

        let mut vars = MINIMAL.to_vec();
        vars.push(("QR_SIZE", "0"));
        assert_eq!(load(&vars).unwrap_err().field, "QR_SIZE");

        let mut vars = MINIMAL.to_vec();
        vars.push(("SHORTENER_BASE_URL", "api.aws3.link"));
        assert_eq!(load(&vars).unwrap_err().field, "SHORTENER_BASE_URL");
    }

    #[test]
    fn link_settings_override() {
        let mut vars = MINIMAL.to_vec();
        vars.extend([("SHORT_DOMAIN", "https://go.example"), ("QR_SIZE", "300")]);
        let cfg = load(&vars).unwrap();
        assert_eq!(cfg.links.short_domain, "https://go.example");
        assert_eq!(cfg.links.qr_size, 300);
        assert_eq!(cfg.links.qr_provider, DEFAULT_QR_PROVIDER);
    }
}
