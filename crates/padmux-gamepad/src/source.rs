use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{ControllerSnapshot, SlotIndex, SlotSet};

/// Per-slot access to the host input API.
///
/// Reads are pure queries. A failed read is not an error: it means there is
/// no data for that slot right now, and callers try again on their next poll.
/// A slot that is present but untouched reads as an all-zero snapshot.
pub trait SlotSource: Send + Sync {
    /// Current state of `slot`, or `None` when nothing answers there.
    fn read(&self, slot: SlotIndex) -> Option<ControllerSnapshot>;

    /// Set both vibration motors of `slot`. Intensities span the full `u16`
    /// range, `0` stops a motor.
    fn set_vibration(&self, slot: SlotIndex, left: u16, right: u16) -> Result<()>;

    /// Slots that currently answer a read.
    fn connected(&self) -> SlotSet {
        SlotIndex::all().filter(|slot| self.read(*slot).is_some()).collect()
    }
}

impl<S: SlotSource + ?Sized> SlotSource for Arc<S> {
    fn read(&self, slot: SlotIndex) -> Option<ControllerSnapshot> {
        (**self).read(slot)
    }

    fn set_vibration(&self, slot: SlotIndex, left: u16, right: u16) -> Result<()> {
        (**self).set_vibration(slot, left, right)
    }

    fn connected(&self) -> SlotSet {
        (**self).connected()
    }
}

/// Source for hosts without a supported input backend: every slot reads as
/// disconnected.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSource;

impl SlotSource for NullSource {
    fn read(&self, _slot: SlotIndex) -> Option<ControllerSnapshot> {
        None
    }

    fn set_vibration(&self, slot: SlotIndex, _left: u16, _right: u16) -> Result<()> {
        Err(Error::Disconnected(slot))
    }
}

/// Best backend for the current platform.
#[cfg(windows)]
pub fn default_source() -> Arc<dyn SlotSource> {
    Arc::new(crate::xinput::XInputSource::new())
}

/// Best backend for the current platform.
#[cfg(not(windows))]
pub fn default_source() -> Arc<dyn SlotSource> {
    #[cfg(feature = "sdl2-backend")]
    match crate::sdl::SdlSource::new() {
        Ok(source) => return Arc::new(source),
        Err(e) => log::warn!("SDL2 slot backend unavailable: {e}"),
    }
    log::debug!("no slot backend for this platform, all slots read as disconnected");
    Arc::new(NullSource)
}
