use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::Branding;
use crate::services::database::Backend;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub admin: AdminSettings,
    #[serde(default)]
    pub pairing: PairingSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub branding: BrandingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Remote Postgres connection string; the local SQLite file is used when absent
    pub url: Option<String>,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
    /// Reject Postgres URLs that do not ask for TLS
    #[serde(default = "default_true")]
    pub require_tls: bool,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: None,
            sqlite_path: default_sqlite_path(),
            require_tls: true,
            max_connections: None,
            min_connections: None,
            acquire_timeout_secs: None,
            idle_timeout_secs: None,
        }
    }
}

fn default_sqlite_path() -> PathBuf { PathBuf::from("pairings_db.sqlite") }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct AdminSettings {
    #[serde(default = "default_admin_password")]
    pub password: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// HMAC secret for session tokens; random per process when unset
    pub token_secret: Option<String>,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            password: default_admin_password(),
            session_ttl_secs: default_session_ttl(),
            token_secret: None,
        }
    }
}

pub const DEFAULT_ADMIN_PASSWORD: &str = "change-me";

fn default_admin_password() -> String { DEFAULT_ADMIN_PASSWORD.to_string() }
fn default_session_ttl() -> u64 { 12 * 60 * 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct PairingSettings {
    /// Opponents within this many weeks count as a rematch
    #[serde(default = "default_recent_weeks")]
    pub recent_weeks: i64,
    #[serde(default = "default_true")]
    pub allow_rematches: bool,
}

impl Default for PairingSettings {
    fn default() -> Self {
        Self {
            recent_weeks: default_recent_weeks(),
            allow_rematches: true,
        }
    }
}

fn default_recent_weeks() -> i64 { 2 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl(),
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_ttl() -> u64 { 180 }
fn default_cache_capacity() -> u64 { 64 }

#[derive(Debug, Clone, Deserialize)]
pub struct BrandingSettings {
    pub logo_url: Option<String>,
    #[serde(default = "default_logo_width")]
    pub logo_width: u32,
    pub tow_logo_url: Option<String>,
    pub hh_logo_url: Option<String>,
    #[serde(default = "default_logo_width")]
    pub header_logo_width: u32,
    pub venue_url: Option<String>,
    pub venue_logo_url: Option<String>,
    pub discord_url: Option<String>,
    pub discord_logo_url: Option<String>,
}

impl Default for BrandingSettings {
    fn default() -> Self {
        Self {
            logo_url: None,
            logo_width: default_logo_width(),
            tow_logo_url: None,
            hh_logo_url: None,
            header_logo_width: default_logo_width(),
            venue_url: None,
            venue_logo_url: None,
            discord_url: None,
            discord_logo_url: None,
        }
    }
}

fn default_logo_width() -> u32 { 120 }

impl From<&BrandingSettings> for Branding {
    fn from(b: &BrandingSettings) -> Self {
        let url = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        Branding {
            logo_url: url(&b.logo_url),
            logo_width: b.logo_width,
            tow_logo_url: url(&b.tow_logo_url),
            hh_logo_url: url(&b.hh_logo_url),
            header_logo_width: b.header_logo_width,
            venue_url: url(&b.venue_url),
            venue_logo_url: url(&b.venue_logo_url),
            discord_url: url(&b.discord_url),
            discord_logo_url: url(&b.discord_logo_url),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

/// Top-level secret names (as used in `secrets.toml` and the environment)
/// and the setting each one feeds
const SECRET_KEYS: &[(&str, &str)] = &[
    ("DATABASE_URL", "database.url"),
    ("ADMIN_PASSWORD", "admin.password"),
    ("LOGO_URL", "branding.logo_url"),
    ("LOGO_WIDTH", "branding.logo_width"),
    ("TOW_LOGO_URL", "branding.tow_logo_url"),
    ("HH_LOGO_URL", "branding.hh_logo_url"),
    ("HEADER_LOGO_WIDTH", "branding.header_logo_width"),
    ("ELEMENT_GAMES_URL", "branding.venue_url"),
    ("ELEMENT_LOGO_URL", "branding.venue_logo_url"),
    ("DISCORD_URL", "branding.discord_url"),
    ("DISCORD_LOGO_URL", "branding.discord_logo_url"),
];

impl Settings {
    /// Load configuration from files, the secrets file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Secrets file (secrets.toml, never committed)
    /// 5. Environment variables prefixed with PAIRINGS__
    ///    e.g. PAIRINGS__SERVER__PORT -> server.port
    /// 6. Bare secret variables such as DATABASE_URL and ADMIN_PASSWORD
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("secrets").required(false))
            .add_source(prefixed_env())
            .build()?;

        apply_secrets(settings, |key| std::env::var(key).ok())?.try_deserialize()
    }

    /// Load configuration from a custom path; the process environment is not consulted
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        apply_secrets(settings, |_| None)?.try_deserialize()
    }
}

fn prefixed_env() -> Environment {
    Environment::with_prefix("PAIRINGS")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Map top-level secrets onto their settings
///
/// A value from `lookup` (the environment) beats one found in the loaded
/// sources; empty values are treated as unset.
fn apply_secrets<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = Vec::new();
    for (secret, target) in SECRET_KEYS {
        let value = lookup(secret)
            .or_else(|| settings.get_string(secret).ok())
            .or_else(|| settings.get_string(&secret.to_lowercase()).ok())
            .filter(|v| !v.trim().is_empty());
        if let Some(value) = value {
            overrides.push((*target, value));
        }
    }

    let mut builder = Config::builder().add_source(settings);
    for (target, value) in overrides {
        builder = builder.set_override(target, value)?;
    }
    builder.build()
}

/// Problems with the database connection settings, reported before any
/// connection attempt
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("DATABASE_URL is malformed: {0}")]
    MalformedUrl(String),

    #[error("DATABASE_URL uses unsupported scheme '{0}' (expected postgres:// or sqlite:)")]
    UnsupportedScheme(String),

    #[error("DATABASE_URL must request TLS (add ?sslmode=require) for remote Postgres")]
    InsecureConnection,
}

/// Where the application keeps its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseTarget {
    pub url: String,
    pub backend: Backend,
    /// Set when the data lives in a local SQLite file
    pub sqlite_file: Option<PathBuf>,
}

impl DatabaseSettings {
    /// Decide which database to use
    ///
    /// Without a URL the local SQLite file is used. A URL that is present but
    /// unusable is an error, never a reason to fall back.
    pub fn resolve(&self) -> Result<DatabaseTarget, SetupError> {
        let url = match self.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => url,
            None => {
                return Ok(DatabaseTarget {
                    url: format!("sqlite://{}?mode=rwc", self.sqlite_path.display()),
                    backend: Backend::Sqlite,
                    sqlite_file: Some(self.sqlite_path.clone()),
                });
            }
        };

        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme.to_lowercase())
            .ok_or_else(|| SetupError::MalformedUrl("missing scheme".to_string()))?;

        match scheme.as_str() {
            "postgres" | "postgresql" => {
                let rest = url
                    .split_once("://")
                    .map(|(_, rest)| rest)
                    .ok_or_else(|| SetupError::MalformedUrl("expected scheme://".to_string()))?;
                let authority = rest.split(['/', '?']).next().unwrap_or_default();
                let host = authority.rsplit('@').next().unwrap_or_default();
                if host.is_empty() || host.starts_with(':') {
                    return Err(SetupError::MalformedUrl("missing host".to_string()));
                }
                if self.require_tls && !requests_tls(url) {
                    return Err(SetupError::InsecureConnection);
                }
                Ok(DatabaseTarget {
                    url: url.to_string(),
                    backend: Backend::Postgres,
                    sqlite_file: None,
                })
            }
            "sqlite" => {
                let path = url
                    .trim_start_matches("sqlite:")
                    .trim_start_matches("//")
                    .split('?')
                    .next()
                    .unwrap_or_default();
                let sqlite_file = (!path.is_empty() && path != ":memory:").then(|| PathBuf::from(path));
                Ok(DatabaseTarget {
                    url: url.to_string(),
                    backend: Backend::Sqlite,
                    sqlite_file,
                })
            }
            other => Err(SetupError::UnsupportedScheme(other.to_string())),
        }
    }
}

fn requests_tls(url: &str) -> bool {
    let Some((_, query)) = url.split_once('?') else {
        return false;
    };
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| {
            matches!(key, "sslmode" | "ssl-mode")
                && matches!(value.to_lowercase().as_str(), "require" | "verify-ca" | "verify-full")
        })
}
