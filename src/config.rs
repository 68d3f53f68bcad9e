use crate::error::{DashboardError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "dashboard.toml";

const ENV_DATA: &str = "DASHBOARD_DATA";
const ENV_SHEET: &str = "DASHBOARD_SHEET";
const ENV_BIND: &str = "DASHBOARD_BIND";
const ENV_INTERVAL: &str = "DASHBOARD_INTERVAL_SECS";

/// Upper bound for every duration setting (one year). Deadlines are computed
/// as `Instant + Duration` and must not overflow.
const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Runtime settings of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Sales spreadsheet to display
    pub data_path: PathBuf,

    /// Worksheet name; the first sheet when unset
    pub sheet: Option<String>,

    /// Address the web server listens on
    pub bind_addr: String,

    /// Seconds between automatic seller changes
    pub advance_interval_secs: u64,

    /// Idle seconds before a browser session is dropped
    pub session_ttl_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data_path: PathBuf::from("test.xlsx"),
            sheet: None,
            bind_addr: "127.0.0.1:3000".to_string(),
            advance_interval_secs: 10,
            session_ttl_secs: 24 * 60 * 60,
        }
    }
}

impl DashboardConfig {
    /// Load configuration
    ///
    /// Search order:
    /// 1. `path` when given (must exist)
    /// 2. `dashboard.toml` in the working directory, if present
    /// 3. Built-in defaults
    ///
    /// `DASHBOARD_*` environment variables override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => {
                info!("Using default configuration");
                Self::default()
            }
        };

        config.apply_overrides(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        info!("Loading config from: {}", path.display());
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| DashboardError::Config(e.to_string()))
    }

    /// Applies `DASHBOARD_*` overrides from a list of environment pairs.
    pub fn apply_overrides<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENV_DATA => self.data_path = PathBuf::from(value),
                ENV_SHEET if value.is_empty() => self.sheet = None,
                ENV_SHEET => self.sheet = Some(value),
                ENV_BIND => self.bind_addr = value,
                ENV_INTERVAL => {
                    self.advance_interval_secs = value.trim().parse().map_err(|_| {
                        DashboardError::Config(format!("{ENV_INTERVAL} must be a number, got '{value}'"))
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.advance_interval_secs == 0 {
            return Err(DashboardError::Config(
                "advance_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.session_ttl_secs == 0 {
            return Err(DashboardError::Config(
                "session_ttl_secs must be at least 1".to_string(),
            ));
        }
        for (key, secs) in [
            ("advance_interval_secs", self.advance_interval_secs),
            ("session_ttl_secs", self.session_ttl_secs),
        ] {
            if secs > MAX_DURATION_SECS {
                return Err(DashboardError::Config(format!(
                    "{key} must be at most {MAX_DURATION_SECS}, got {secs}"
                )));
            }
        }
        if self.bind_addr.trim().is_empty() {
            return Err(DashboardError::Config("bind_addr is empty".to_string()));
        }
        Ok(())
    }

    pub fn advance_interval(&self) -> Duration {
        Duration::from_secs(self.advance_interval_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}
