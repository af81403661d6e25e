use std::sync::mpsc;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use sdl2::controller::{Axis as SdlAxis, Button as SdlButton, GameController};
use sdl2::event::Event;
use sdl2::GameControllerSubsystem;

use crate::error::{Error, Result};
use crate::source::SlotSource;
use crate::types::{Button, ControllerSnapshot, GamepadState, SlotIndex, SLOT_COUNT};

/// How long the runtime waits for SDL events before sampling again.
const EVENT_WAIT_MS: u32 = 2;

/// SDL rumble always has a duration; this keeps a motor going until the next
/// command, which matches how XInput vibration behaves.
const RUMBLE_HOLD_MS: u32 = 10_000;

const BUTTON_MAP: [(SdlButton, Button); 14] = [
    (SdlButton::DPadUp, Button::DPadUp),
    (SdlButton::DPadDown, Button::DPadDown),
    (SdlButton::DPadLeft, Button::DPadLeft),
    (SdlButton::DPadRight, Button::DPadRight),
    (SdlButton::Start, Button::Start),
    (SdlButton::Back, Button::Back),
    (SdlButton::LeftStick, Button::LeftThumb),
    (SdlButton::RightStick, Button::RightThumb),
    (SdlButton::LeftShoulder, Button::LeftShoulder),
    (SdlButton::RightShoulder, Button::RightShoulder),
    (SdlButton::A, Button::A),
    (SdlButton::B, Button::B),
    (SdlButton::X, Button::X),
    (SdlButton::Y, Button::Y),
];

/// Internal commands sent to the runtime thread.
enum Command {
    Rumble { slot: SlotIndex, low: u16, high: u16 },
}

type SlotTable = [Option<ControllerSnapshot>; SLOT_COUNT];

/// Slot table published by the runtime loop.
type SharedSlots = Arc<RwLock<SlotTable>>;

/// SDL2-backed slots. Game controllers take the lowest free slot when they
/// are opened and give it back on removal.
///
/// The runtime thread exits once the source is dropped.
pub struct SdlSource {
    slots: SharedSlots,
    cmd_tx: Sender<Command>,
}

impl SdlSource {
    /// Starts the runtime thread and waits (up to 1s) for the initial
    /// enumeration.
    pub fn new() -> Result<Self> {
        let (cmd_tx, cmd_rx) = unbounded::<Command>();
        let slots: SharedSlots = Arc::new(RwLock::new([None; SLOT_COUNT]));

        let (ready_tx, ready_rx) = mpsc::channel();
        start_runtime_thread(Arc::clone(&slots), cmd_rx, ready_tx)?;

        match ready_rx.recv_timeout(Duration::from_secs(1)) {
            Ok(Ok(())) => Ok(Self { slots, cmd_tx }),
            Ok(Err(e)) => Err(Error::BackendInit(e)),
            Err(_) => Err(Error::BackendInit("SDL runtime did not start".into())),
        }
    }
}

impl SlotSource for SdlSource {
    fn read(&self, slot: SlotIndex) -> Option<ControllerSnapshot> {
        let slots = self.slots.read().ok()?;
        slots[slot.get() as usize]
    }

    fn set_vibration(&self, slot: SlotIndex, left: u16, right: u16) -> Result<()> {
        if self.read(slot).is_none() {
            return Err(Error::Disconnected(slot));
        }
        self.cmd_tx
            .send(Command::Rumble {
                slot,
                low: left,
                high: right,
            })
            .map_err(|e| Error::Backend(format!("{e}")))
    }
}

/// A controller bound to a slot plus the last state published for it.
struct Bound {
    controller: GameController,
    published: ControllerSnapshot,
}

fn start_runtime_thread(
    slots: SharedSlots,
    cmd_rx: Receiver<Command>,
    ready_tx: mpsc::Sender<std::result::Result<(), String>>,
) -> Result<()> {
    thread::Builder::new()
        .name("padmux-sdl".into())
        .spawn(move || {
            // SDL must live entirely within this thread
            let sdl_ctx = match sdl2::init() {
                Ok(ctx) => ctx,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let controller_subsystem = match sdl_ctx.game_controller() {
                Ok(c) => c,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };
            let mut event_pump = match sdl_ctx.event_pump() {
                Ok(p) => p,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let mut bound: [Option<Bound>; SLOT_COUNT] = Default::default();

            // Initial enumeration
            if let Ok(num_joysticks) = controller_subsystem.num_joysticks() {
                for i in 0..num_joysticks {
                    open_into_free_slot(&controller_subsystem, &mut bound, i);
                }
            }
            publish(&slots, &mut bound);
            let _ = ready_tx.send(Ok(()));

            loop {
                if let Some(event) = event_pump.wait_event_timeout(EVENT_WAIT_MS) {
                    handle_event(&controller_subsystem, &mut bound, event);
                    // Drain any additional queued events quickly
                    for event in event_pump.poll_iter() {
                        handle_event(&controller_subsystem, &mut bound, event);
                    }
                }
                publish(&slots, &mut bound);

                // Handle commands; a closed channel means the source was dropped
                loop {
                    match cmd_rx.try_recv() {
                        Ok(Command::Rumble { slot, low, high }) => {
                            rumble(&mut bound, slot, low, high);
                        }
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => return,
                    }
                }
            }
        })
        .map(|_| ())
        .map_err(|e| Error::BackendInit(e.to_string()))
}

fn handle_event(
    subsystem: &GameControllerSubsystem,
    bound: &mut [Option<Bound>; SLOT_COUNT],
    event: Event,
) {
    match event {
        Event::ControllerDeviceAdded { which, .. } => {
            open_into_free_slot(subsystem, bound, which);
        }
        Event::ControllerDeviceRemoved { which, .. } => {
            for (i, entry) in bound.iter_mut().enumerate() {
                if entry
                    .as_ref()
                    .is_some_and(|b| b.controller.instance_id() == which)
                {
                    log::debug!("controller removed from slot {i}");
                    *entry = None;
                }
            }
        }
        _ => {}
    }
}

fn open_into_free_slot(
    subsystem: &GameControllerSubsystem,
    bound: &mut [Option<Bound>; SLOT_COUNT],
    device_index: u32,
) {
    if !subsystem.is_game_controller(device_index) {
        return;
    }
    let Ok(controller) = subsystem.open(device_index) else {
        return;
    };
    // Added events are also sent for devices opened during enumeration
    let id = controller.instance_id();
    if bound.iter().flatten().any(|b| b.controller.instance_id() == id) {
        return;
    }
    let Some(free) = bound.iter().position(Option::is_none) else {
        log::debug!("no free slot for controller {}", controller.name());
        return;
    };
    log::debug!("controller {} bound to slot {free}", controller.name());
    bound[free] = Some(Bound {
        controller,
        published: ControllerSnapshot::default(),
    });
}

fn publish(slots: &RwLock<SlotTable>, bound: &mut [Option<Bound>; SLOT_COUNT]) {
    let mut table: SlotTable = [None; SLOT_COUNT];
    for (i, entry) in bound.iter_mut().enumerate() {
        if let Some(b) = entry {
            let pad = sample(&b.controller);
            if pad != b.published.pad {
                b.published = ControllerSnapshot::new(b.published.packet.wrapping_add(1), pad);
            }
            table[i] = Some(b.published);
        }
    }
    if let Ok(mut shared) = slots.write() {
        *shared = table;
    }
}

/// Reads a controller in XInput conventions: Y axes point up and triggers
/// span `0..=255`.
fn sample(controller: &GameController) -> GamepadState {
    let mut buttons = 0u16;
    for (sdl, button) in BUTTON_MAP {
        if controller.button(sdl) {
            buttons |= button.mask();
        }
    }
    GamepadState {
        buttons,
        left_trigger: trigger(controller.axis(SdlAxis::TriggerLeft)),
        right_trigger: trigger(controller.axis(SdlAxis::TriggerRight)),
        thumb_lx: controller.axis(SdlAxis::LeftX),
        thumb_ly: controller.axis(SdlAxis::LeftY).saturating_neg(),
        thumb_rx: controller.axis(SdlAxis::RightX),
        thumb_ry: controller.axis(SdlAxis::RightY).saturating_neg(),
    }
}

#[inline]
fn trigger(value: i16) -> u8 {
    (value.max(0) >> 7) as u8
}

fn rumble(bound: &mut [Option<Bound>; SLOT_COUNT], slot: SlotIndex, low: u16, high: u16) {
    let Some(b) = bound[slot.get() as usize].as_mut() else {
        return;
    };
    let duration = if low == 0 && high == 0 { 0 } else { RUMBLE_HOLD_MS };
    if let Err(e) = b.controller.set_rumble(low, high, duration) {
        log::debug!("failed to set rumble on slot {slot}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_scales_to_byte_range() {
        assert_eq!(trigger(0), 0);
        assert_eq!(trigger(-5), 0);
        assert_eq!(trigger(i16::MAX), 255);
        assert_eq!(trigger(16384), 128);
    }

    #[test]
    fn button_map_covers_every_button_once() {
        let mut bits = 0u16;
        for (_, button) in BUTTON_MAP {
            let bit = button.mask();
            assert_eq!(bits & bit, 0, "{button:?} mapped twice");
            bits |= bit;
        }
        assert_eq!(bits, Button::KNOWN_BITS);
    }
}
