//! Mirrors whichever physical controller is in use onto one virtual
//! controller, and routes that virtual controller's rumble back to it.
//!
//! The pieces, leaf first:
//! - [`Arbiter`] picks the owning slot each tick.
//! - [`VirtualPadBinding`] normalizes and pushes owner state to the device.
//! - [`FeedbackRouter`] forwards rumble to the current owner.
//! - [`Aggregator`] runs the polling loop on its own thread and owns the
//!   device lifecycle.

mod aggregator;
mod arbiter;
mod binding;
mod config;
mod error;
mod feedback;
mod owner;

#[cfg(test)]
mod testing;

pub use crate::aggregator::Aggregator;
pub use crate::arbiter::Arbiter;
pub use crate::binding::VirtualPadBinding;
pub use crate::config::AggregatorConfig;
pub use crate::error::{Error, Result};
pub use crate::feedback::FeedbackRouter;
pub use crate::owner::{OwnerCell, OwnerState};
