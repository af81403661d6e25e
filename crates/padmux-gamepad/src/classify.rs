use crate::types::{Button, GamepadState};

const DEFAULT_STICK_DEADZONE: u16 = 6000;
const DEFAULT_TRIGGER_DEADZONE: u8 = 5;

/// Thresholds separating real input from rest noise of worn analog parts.
/// Fixed once an aggregator is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadzones {
    /// Stick radius in raw axis units, applied to each axis independently.
    pub stick: u16,
    /// Trigger floor in raw units.
    pub trigger: u8,
}

impl Default for Deadzones {
    fn default() -> Self {
        Self {
            stick: DEFAULT_STICK_DEADZONE,
            trigger: DEFAULT_TRIGGER_DEADZONE,
        }
    }
}

impl Deadzones {
    pub const fn new(stick: u16, trigger: u8) -> Self {
        Self { stick, trigger }
    }

    /// Whether `pad` carries user input rather than rest noise: any button
    /// bit, a trigger above the floor, or any stick axis beyond the radius.
    pub fn is_active(&self, pad: &GamepadState) -> bool {
        pad.buttons != 0
            || pad.left_trigger > self.trigger
            || pad.right_trigger > self.trigger
            || [pad.thumb_lx, pad.thumb_ly, pad.thumb_rx, pad.thumb_ry]
                .into_iter()
                .any(|axis| axis.unsigned_abs() > self.stick)
    }

    /// State to mirror on the virtual device: unnamed button bits dropped,
    /// triggers at or below the floor and stick axes inside the radius zeroed.
    pub fn normalize(&self, pad: &GamepadState) -> GamepadState {
        GamepadState {
            buttons: pad.buttons & Button::KNOWN_BITS,
            left_trigger: self.trigger(pad.left_trigger),
            right_trigger: self.trigger(pad.right_trigger),
            thumb_lx: self.axis(pad.thumb_lx),
            thumb_ly: self.axis(pad.thumb_ly),
            thumb_rx: self.axis(pad.thumb_rx),
            thumb_ry: self.axis(pad.thumb_ry),
        }
    }

    #[inline]
    fn trigger(&self, value: u8) -> u8 {
        if value <= self.trigger {
            0
        } else {
            value
        }
    }

    #[inline]
    fn axis(&self, value: i16) -> i16 {
        if value.unsigned_abs() < self.stick {
            0
        } else {
            value
        }
    }
}
