use std::fmt;

use padmux_bit_derive::Bit;
use padmux_bit_mask::{Bitable, Bitmask};

/// Number of physical slots exposed by the host input API.
pub const SLOT_COUNT: usize = 4;

/// Digital buttons of a slot. Discriminants are positions in the native
/// 16-bit button word, so `Button::A.bit()` is `0x1000`.
#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    DPadUp = 0,
    DPadDown,
    DPadLeft,
    DPadRight,
    Start,
    Back,
    LeftThumb,
    RightThumb,
    LeftShoulder,
    RightShoulder,
    A = 12,
    B,
    X,
    Y,
}

impl Button {
    /// Every button, in native bit order.
    pub const ALL: [Button; 14] = [
        Button::DPadUp,
        Button::DPadDown,
        Button::DPadLeft,
        Button::DPadRight,
        Button::Start,
        Button::Back,
        Button::LeftThumb,
        Button::RightThumb,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
    ];

    /// Mask of all bits that name a button.
    pub const KNOWN_BITS: u16 = 0xF3FF;

    /// Bit of this button in the native 16-bit word.
    pub const fn mask(self) -> u16 {
        1 << self as u16
    }

    /// Display name used in status lines.
    pub fn name(self) -> &'static str {
        match self {
            Button::DPadUp => "DPAD_UP",
            Button::DPadDown => "DPAD_DOWN",
            Button::DPadLeft => "DPAD_LEFT",
            Button::DPadRight => "DPAD_RIGHT",
            Button::Start => "START",
            Button::Back => "BACK",
            Button::LeftThumb => "LEFT_THUMB",
            Button::RightThumb => "RIGHT_THUMB",
            Button::LeftShoulder => "LEFT_SHOULDER",
            Button::RightShoulder => "RIGHT_SHOULDER",
            Button::A => "A",
            Button::B => "B",
            Button::X => "X",
            Button::Y => "Y",
        }
    }
}

/// A set of pressed buttons.
pub type ButtonSet = Bitmask<Button>;

/// One physical controller connection point, always in `0..SLOT_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Returns `None` when `index` does not name a slot.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < SLOT_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// All slots in scan order.
    pub fn all() -> impl Iterator<Item = SlotIndex> {
        (0..SLOT_COUNT as u8).map(SlotIndex)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Bitable for SlotIndex {
    #[inline]
    fn bit(&self) -> u64 {
        1u64 << self.0
    }

    #[inline]
    fn index(&self) -> u32 {
        u32::from(self.0)
    }

    #[inline]
    fn from_index(index: u32) -> Option<Self> {
        u8::try_from(index).ok().and_then(SlotIndex::new)
    }
}

/// A set of slots.
pub type SlotSet = Bitmask<SlotIndex>;

/// Fixed-layout controller record, as the host input API reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GamepadState {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub thumb_lx: i16,
    pub thumb_ly: i16,
    pub thumb_rx: i16,
    pub thumb_ry: i16,
}

impl GamepadState {
    /// All buttons released, all axes at rest.
    pub const NEUTRAL: GamepadState = GamepadState {
        buttons: 0,
        left_trigger: 0,
        right_trigger: 0,
        thumb_lx: 0,
        thumb_ly: 0,
        thumb_rx: 0,
        thumb_ry: 0,
    };

    /// Named buttons currently held. Unnamed bits are ignored.
    pub fn pressed(&self) -> ButtonSet {
        ButtonSet::from_value(u64::from(self.buttons & Button::KNOWN_BITS))
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed().contains(button)
    }

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

/// One poll of a slot. Produced fresh on every read and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ControllerSnapshot {
    /// Sequence number supplied by the source; grows when the state changes.
    pub packet: u32,
    pub pad: GamepadState,
}

impl ControllerSnapshot {
    pub const fn new(packet: u32, pad: GamepadState) -> Self {
        Self { packet, pad }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_bits_match_native_layout() {
        assert_eq!(Button::DPadUp.bit(), 0x0001);
        assert_eq!(Button::DPadRight.bit(), 0x0008);
        assert_eq!(Button::Start.bit(), 0x0010);
        assert_eq!(Button::RightShoulder.bit(), 0x0200);
        assert_eq!(Button::A.bit(), 0x1000);
        assert_eq!(Button::Y.bit(), 0x8000);
    }

    #[test]
    fn known_bits_cover_every_button() {
        let all: u64 = Button::ALL.iter().map(Bitable::bit).sum();
        assert_eq!(all, u64::from(Button::KNOWN_BITS));
    }

    #[test]
    fn pressed_ignores_unnamed_bits() {
        let pad = GamepadState {
            buttons: 0x1000 | 0x0400 | 0x0001,
            ..GamepadState::default()
        };
        let pressed: Vec<_> = pad.pressed().iter().collect();
        assert_eq!(pressed, vec![Button::DPadUp, Button::A]);
    }

    #[test]
    fn slot_index_rejects_out_of_range() {
        assert!(SlotIndex::new(3).is_some());
        assert!(SlotIndex::new(4).is_none());
        assert_eq!(SlotIndex::all().count(), SLOT_COUNT);
    }

    #[test]
    fn slot_set_iterates_in_scan_order() {
        let set: SlotSet = [SlotIndex::new(2), SlotIndex::new(0)]
            .into_iter()
            .flatten()
            .collect();
        let slots: Vec<u8> = set.iter().map(SlotIndex::get).collect();
        assert_eq!(slots, vec![0, 2]);
    }
}
