//! Configuration for the linetrack console.
//!
//! Built-in defaults, then `config.toml` from the platform config
//! directory, then `LINETRACK_*` environment variables (nested keys split
//! on `__`, e.g. `LINETRACK_API__ADMIN_URL`). [`Config::to_settings`]
//! validates the result and turns it into the runtime [`Settings`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use linetrack_core::{Direction, RecordId, TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Where the backend lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the counter endpoint.
    #[serde(default = "default_url")]
    pub counter_url: String,

    /// Base URL of the business/station endpoints.
    #[serde(default = "default_url")]
    pub admin_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Extra CA certificate (PEM) to trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            counter_url: default_url(),
            admin_url: default_url(),
            timeout: default_timeout(),
            insecure: false,
            ca_cert: None,
        }
    }
}

/// Dashboard layout and refresh behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Seconds between counter fetches.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Stations whose boxes show no Before/After heading.
    #[serde(default = "default_boundary_stations")]
    pub boundary_stations: Vec<String>,

    /// Counter boxes, in display order.
    #[serde(default)]
    pub counters: Vec<CounterConfig>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            boundary_stations: default_boundary_stations(),
            counters: Vec::new(),
        }
    }
}

/// One counter box.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CounterConfig {
    pub station: String,
    pub direction: Direction,
}

fn default_url() -> String {
    "http://localhost:3334".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    30
}
fn default_boundary_stations() -> Vec<String> {
    vec!["1".into(), "2".into()]
}

// ── Runtime settings ────────────────────────────────────────────────

/// Validated configuration, ready to build a client and pollers from.
#[derive(Debug, Clone)]
pub struct Settings {
    pub counter_url: Url,
    pub admin_url: Url,
    pub transport: TransportConfig,
    pub poll_interval: Duration,
    pub boundary_stations: Vec<RecordId>,
    pub counters: Vec<(RecordId, Direction)>,
}

impl Config {
    /// Validate and translate into runtime [`Settings`].
    pub fn to_settings(&self) -> Result<Settings, ConfigError> {
        let counter_url = parse_url("api.counter_url", &self.api.counter_url)?;
        let admin_url = parse_url("api.admin_url", &self.api.admin_url)?;

        if self.api.timeout == 0 {
            return Err(ConfigError::Validation {
                field: "api.timeout".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.dashboard.poll_interval == 0 {
            return Err(ConfigError::Validation {
                field: "dashboard.poll_interval".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let tls = if self.api.insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = self.api.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };

        let counters = self
            .dashboard
            .counters
            .iter()
            .map(|c| {
                let station = c.station.trim();
                if station.is_empty() {
                    return Err(ConfigError::Validation {
                        field: "dashboard.counters.station".into(),
                        reason: "must not be empty".into(),
                    });
                }
                Ok((RecordId::from(station), c.direction))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Settings {
            counter_url,
            admin_url,
            transport: TransportConfig {
                tls,
                timeout: Duration::from_secs(self.api.timeout),
            },
            poll_interval: Duration::from_secs(self.dashboard.poll_interval),
            boundary_stations: self
                .dashboard
                .boundary_stations
                .iter()
                .map(|s| RecordId::from(s.as_str()))
                .collect(),
            counters,
        })
    }
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "linetrack", "linetrack").map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("linetrack");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from `path` plus environment. A missing file is not an
/// error; defaults apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LINETRACK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize `cfg` to TOML at `path`, creating parent directories.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
