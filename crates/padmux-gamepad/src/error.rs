use thiserror::Error;

use crate::types::SlotIndex;

/// Error type for physical slot operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to initialize the backend (XInput, SDL2 or subsystems).
    #[error("Backend init failed: {0}")]
    BackendInit(String),
    /// Nothing is connected to the requested slot.
    #[error("Slot {0} is not connected")]
    Disconnected(SlotIndex),
    /// A generic backend error.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Convenient result alias for slot operations.
pub type Result<T> = std::result::Result<T, Error>;
