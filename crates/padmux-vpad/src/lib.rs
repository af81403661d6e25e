//! Synthetic controller devices that other programs see as an ordinary
//! physical pad.

mod error;
mod target;

#[cfg(windows)]
mod vigem;

pub use crate::error::{Error, Result};
pub use crate::target::{
    default_bus, Feedback, FeedbackHandler, UnavailableBus, VirtualBus, VirtualTarget,
};

#[cfg(windows)]
pub use crate::vigem::ViGEmBus;
