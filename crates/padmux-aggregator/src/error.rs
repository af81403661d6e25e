use thiserror::Error;

/// Error type for aggregator lifecycle operations.
///
/// None of these are fatal to a host: every failure leaves the virtual
/// controller feature disabled or skips a single update.
#[derive(Debug, Error)]
pub enum Error {
    /// The virtual controller bus is missing; the feature stays disabled.
    #[error("Virtual controller unavailable: {0}")]
    DriverUnavailable(String),
    /// The virtual device rejected an operation.
    #[error("Virtual device error: {0}")]
    Device(#[source] padmux_vpad::Error),
    /// Construction parameters are out of range.
    #[error("Invalid aggregator config: {0}")]
    InvalidConfig(String),
    #[error("Aggregator is already running")]
    AlreadyRunning,
    #[error("Aggregator is not running")]
    NotRunning,
    /// The polling thread could not be started.
    #[error("Failed to spawn aggregator loop: {0}")]
    Spawn(#[source] std::io::Error),
}

impl From<padmux_vpad::Error> for Error {
    fn from(e: padmux_vpad::Error) -> Self {
        match e {
            padmux_vpad::Error::DriverUnavailable(reason) => Error::DriverUnavailable(reason),
            other => Error::Device(other),
        }
    }
}

/// Convenient result alias for aggregator operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_errors_keep_missing_driver_distinct() {
        let missing = padmux_vpad::Error::DriverUnavailable("no bus".into());
        assert!(matches!(Error::from(missing), Error::DriverUnavailable(r) if r == "no bus"));

        let refused = padmux_vpad::Error::Target("plug in failed".into());
        assert!(matches!(
            Error::from(refused),
            Error::Device(padmux_vpad::Error::Target(_))
        ));
    }
}
