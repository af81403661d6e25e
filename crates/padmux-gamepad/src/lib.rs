//! Physical controller slots: state snapshots, activity classification and
//! the host backends that read them.

mod classify;
mod error;
mod source;
mod types;

#[cfg(feature = "sdl2-backend")]
mod sdl;
#[cfg(windows)]
mod xinput;

pub use crate::classify::Deadzones;
pub use crate::error::{Error, Result};
pub use crate::source::{default_source, NullSource, SlotSource};
pub use crate::types::{
    Button, ButtonSet, ControllerSnapshot, GamepadState, SlotIndex, SlotSet, SLOT_COUNT,
};

#[cfg(feature = "sdl2-backend")]
pub use crate::sdl::SdlSource;
#[cfg(windows)]
pub use crate::xinput::XInputSource;
