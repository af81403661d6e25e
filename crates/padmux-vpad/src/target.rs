use padmux_gamepad::{GamepadState, SlotIndex};

use crate::error::{Error, Result};

/// Force-feedback request addressed to a virtual device by the program
/// consuming it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Feedback {
    pub large_motor: u8,
    pub small_motor: u8,
    pub led_number: u8,
}

impl Feedback {
    /// Motor intensities widened to the physical `u16` range
    /// (`0..=255` maps onto `0..=65535`).
    pub fn motor_speeds(&self) -> (u16, u16) {
        (
            u16::from(self.large_motor) * 257,
            u16::from(self.small_motor) * 257,
        )
    }
}

/// Callback invoked from the bus's notification context.
pub type FeedbackHandler = Box<dyn FnMut(Feedback) + Send + 'static>;

/// Connection to a virtual-device bus.
pub trait VirtualBus: Send + Sync {
    /// Create and plug in a new virtual controller.
    ///
    /// Fails with [`Error::DriverUnavailable`] when the bus driver is missing,
    /// which hosts should treat as "feature disabled".
    fn connect(&self) -> Result<Box<dyn VirtualTarget>>;
}

/// A live virtual controller. Dropping it unplugs the device.
pub trait VirtualTarget: Send {
    /// Push a full state report.
    fn submit(&mut self, state: &GamepadState) -> Result<()>;

    /// Install the single feedback callback, replacing any previous one.
    fn register_feedback(&mut self, handler: FeedbackHandler) -> Result<()>;

    /// Stop delivering feedback. Must be called before the target is dropped.
    fn unregister_feedback(&mut self);

    /// Host slot occupied by the virtual device itself, when the bus knows it.
    fn user_index(&mut self) -> Option<SlotIndex> {
        None
    }
}

/// Bus for hosts without a virtual-device driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBus;

impl VirtualBus for UnavailableBus {
    fn connect(&self) -> Result<Box<dyn VirtualTarget>> {
        Err(Error::DriverUnavailable(
            "no virtual controller bus on this platform".into(),
        ))
    }
}

/// Best bus for the current platform.
#[cfg(windows)]
pub fn default_bus() -> Box<dyn VirtualBus> {
    Box::new(crate::vigem::ViGEmBus)
}

/// Best bus for the current platform.
#[cfg(not(windows))]
pub fn default_bus() -> Box<dyn VirtualBus> {
    Box::new(UnavailableBus)
}
