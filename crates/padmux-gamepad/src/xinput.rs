use std::mem::size_of;

use windows::Win32::Foundation::ERROR_SUCCESS;
use windows::Win32::UI::Input::XboxController::{
    XInputGetState, XInputSetState, XINPUT_GAMEPAD, XINPUT_STATE, XINPUT_VIBRATION,
};

use crate::error::{Error, Result};
use crate::source::SlotSource;
use crate::types::{ControllerSnapshot, GamepadState, SlotIndex};

// The records cross the FFI boundary as-is; their layout is checked once here
// instead of on every call.
const _: () = assert!(size_of::<XINPUT_GAMEPAD>() == 12);
const _: () = assert!(size_of::<XINPUT_STATE>() == 16);
const _: () = assert!(size_of::<XINPUT_VIBRATION>() == 4);

/// XInput-backed slots.
#[derive(Debug, Default, Clone, Copy)]
pub struct XInputSource;

impl XInputSource {
    pub fn new() -> Self {
        Self
    }
}

impl SlotSource for XInputSource {
    fn read(&self, slot: SlotIndex) -> Option<ControllerSnapshot> {
        let mut state = XINPUT_STATE::default();
        // SAFETY: `state` is a valid, writable XINPUT_STATE for the whole call.
        let status = unsafe { XInputGetState(u32::from(slot.get()), &mut state) };
        if status != ERROR_SUCCESS.0 {
            log::trace!("slot {slot} read miss: {status}");
            return None;
        }
        let pad = state.Gamepad;
        Some(ControllerSnapshot::new(
            state.dwPacketNumber,
            GamepadState {
                buttons: pad.wButtons.0,
                left_trigger: pad.bLeftTrigger,
                right_trigger: pad.bRightTrigger,
                thumb_lx: pad.sThumbLX,
                thumb_ly: pad.sThumbLY,
                thumb_rx: pad.sThumbRX,
                thumb_ry: pad.sThumbRY,
            },
        ))
    }

    fn set_vibration(&self, slot: SlotIndex, left: u16, right: u16) -> Result<()> {
        let vibration = XINPUT_VIBRATION {
            wLeftMotorSpeed: left,
            wRightMotorSpeed: right,
        };
        // SAFETY: `vibration` outlives the call and is only read by it.
        let status = unsafe { XInputSetState(u32::from(slot.get()), &vibration) };
        if status == ERROR_SUCCESS.0 {
            Ok(())
        } else {
            Err(Error::Backend(format!(
                "XInputSetState({slot}) failed with {status}"
            )))
        }
    }
}
