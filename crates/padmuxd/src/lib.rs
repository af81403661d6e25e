//! Host daemon for the padmux aggregator: configuration, logging and the
//! launcher navigator.

pub mod config;
pub mod logging;
pub mod navigator;

pub use config::{load_config, parse_config, ConfigError, DaemonConfig};
pub use navigator::{Direction, NavEvent, NavigationHost, Navigator, StatusReport};
