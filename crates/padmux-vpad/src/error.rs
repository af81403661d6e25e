use thiserror::Error;

/// Error type for virtual device operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The virtual-device bus or its driver is not present on this host.
    #[error("Virtual device driver unavailable: {0}")]
    DriverUnavailable(String),
    /// The bus refused to create, plug or update a target.
    #[error("Virtual target error: {0}")]
    Target(String),
}

/// Convenient result alias for virtual device operations.
pub type Result<T> = std::result::Result<T, Error>;
