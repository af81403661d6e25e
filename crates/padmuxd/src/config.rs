use std::path::{Path, PathBuf};
use std::time::Duration;

use padmux_aggregator::AggregatorConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG_DIR: &str = ".config/padmux";
const CONFIG_FILE_NAME: &str = "padmux.yaml";
const CURRENT_VERSION: u8 = 1;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported config version: {0}")]
    UnsupportedVersion(u8),
    #[error("invalid aggregator settings: {0}")]
    InvalidAggregator(#[source] padmux_aggregator::Error),
    #[error("navigator poll_ms must be greater than 0")]
    InvalidNavigatorPoll,
    #[error("environment variable not set: {0}")]
    EnvVarNotSet(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Effective daemon configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    pub version: u8,
    #[serde(default)]
    pub aggregator: AggregatorSection,
    #[serde(default)]
    pub navigator: NavigatorSection,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            aggregator: AggregatorSection::default(),
            navigator: NavigatorSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorSection {
    /// Plug in the virtual controller at startup.
    pub enabled: bool,
    pub poll_hz: u32,
    pub idle_hold_ms: u64,
    pub stick_deadzone: u16,
    pub trigger_deadzone: u8,
    pub stop_timeout_ms: u64,
}

impl Default for AggregatorSection {
    fn default() -> Self {
        let base = AggregatorConfig::default();
        Self {
            enabled: true,
            poll_hz: base.poll_hz,
            idle_hold_ms: base.idle_hold_ms,
            stick_deadzone: base.stick_deadzone,
            trigger_deadzone: base.trigger_deadzone,
            stop_timeout_ms: base.stop_timeout_ms,
        }
    }
}

impl AggregatorSection {
    pub fn to_config(&self) -> AggregatorConfig {
        AggregatorConfig {
            poll_hz: self.poll_hz,
            idle_hold_ms: self.idle_hold_ms,
            stick_deadzone: self.stick_deadzone,
            trigger_deadzone: self.trigger_deadzone,
            stop_timeout_ms: self.stop_timeout_ms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorSection {
    pub poll_ms: u64,
    /// Only navigate while the host window has focus.
    pub require_focus: bool,
}

impl Default for NavigatorSection {
    fn default() -> Self {
        Self {
            poll_ms: 100,
            require_focus: true,
        }
    }
}

impl NavigatorSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

impl DaemonConfig {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn validate(&self) -> Result<()> {
        self.aggregator
            .to_config()
            .validate()
            .map_err(ConfigError::InvalidAggregator)?;
        if self.navigator.poll_ms == 0 {
            return Err(ConfigError::InvalidNavigatorPoll);
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Versioned {
    version: u8,
}

/// Parse a yaml config.
pub fn parse_config(input: &str) -> Result<DaemonConfig> {
    let Versioned { version } = serde_yaml::from_str(input)?;
    if version != CURRENT_VERSION {
        return Err(ConfigError::UnsupportedVersion(version));
    }
    let config: DaemonConfig = serde_yaml::from_str(input)?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path`, or at the default location. A missing file
/// yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<DaemonConfig> {
    let path = match path {
        Some(path) => path.to_owned(),
        None => default_config_path()?,
    };
    match std::fs::read_to_string(&path) {
        Ok(input) => parse_config(&input),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("{} not found, using defaults", path.display());
            Ok(DaemonConfig::default())
        }
        Err(source) => Err(ConfigError::Read {
            path: path.display().to_string(),
            source,
        }),
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map_err(|_| ConfigError::EnvVarNotSet("HOME".to_string()))?;
    Ok(PathBuf::from(home).join(DEFAULT_CONFIG_DIR).join(CONFIG_FILE_NAME))
}
