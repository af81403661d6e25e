//! Scripted slot sources and recording virtual devices for unit tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use padmux_gamepad::{
    ControllerSnapshot, Error as SlotError, GamepadState, SlotIndex, SlotSource, SLOT_COUNT,
};
use padmux_vpad::{
    Error as VpadError, Feedback, FeedbackHandler, VirtualBus, VirtualTarget,
};

pub(crate) fn slot(i: u8) -> SlotIndex {
    SlotIndex::new(i).unwrap()
}

pub(crate) fn pressed(buttons: u16) -> GamepadState {
    GamepadState {
        buttons,
        ..GamepadState::default()
    }
}

/// Slots whose state tests set directly.
#[derive(Default)]
pub(crate) struct FakeSlots {
    slots: Mutex<[Option<ControllerSnapshot>; SLOT_COUNT]>,
    reads: Mutex<Vec<SlotIndex>>,
    pub(crate) vibrations: Mutex<Vec<(SlotIndex, u16, u16)>>,
    pub(crate) fail_vibration: AtomicBool,
    /// Every read blocks this long first.
    pub(crate) read_delay_ms: AtomicU64,
}

impl FakeSlots {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Connect `i` (if needed) and give it `pad`.
    pub(crate) fn set(&self, i: u8, pad: GamepadState) {
        let mut slots = self.slots.lock().unwrap();
        let entry = &mut slots[i as usize];
        let packet = entry.map_or(0, |s| s.packet + 1);
        *entry = Some(ControllerSnapshot::new(packet, pad));
    }

    pub(crate) fn idle(&self, i: u8) {
        self.set(i, GamepadState::default());
    }

    pub(crate) fn disconnect(&self, i: u8) {
        self.slots.lock().unwrap()[i as usize] = None;
    }

    pub(crate) fn take_reads(&self) -> Vec<SlotIndex> {
        std::mem::take(&mut *self.reads.lock().unwrap())
    }
}

impl SlotSource for FakeSlots {
    fn read(&self, slot: SlotIndex) -> Option<ControllerSnapshot> {
        let delay = self.read_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            std::thread::sleep(Duration::from_millis(delay));
        }
        self.reads.lock().unwrap().push(slot);
        self.slots.lock().unwrap()[slot.get() as usize]
    }

    fn set_vibration(&self, slot: SlotIndex, left: u16, right: u16) -> padmux_gamepad::Result<()> {
        if self.fail_vibration.load(Ordering::SeqCst) {
            return Err(SlotError::Backend("motor stalled".into()));
        }
        self.vibrations.lock().unwrap().push((slot, left, right));
        Ok(())
    }
}

/// Everything a [`RecordingTarget`] saw.
#[derive(Default)]
pub(crate) struct TargetLog {
    pub(crate) submitted: Vec<GamepadState>,
    pub(crate) handler: Option<FeedbackHandler>,
    pub(crate) events: Vec<&'static str>,
}

pub(crate) type SharedLog = Arc<Mutex<TargetLog>>;

/// Deliver `feedback` the way the bus notification context would.
pub(crate) fn fire_feedback(log: &SharedLog, feedback: Feedback) -> bool {
    let mut log = log.lock().unwrap();
    match log.handler.as_mut() {
        Some(handler) => {
            handler(feedback);
            true
        }
        None => false,
    }
}

pub(crate) struct RecordingTarget {
    log: SharedLog,
    user_index: Option<SlotIndex>,
    pub(crate) fail_submit: bool,
}

impl RecordingTarget {
    pub(crate) fn new(log: SharedLog) -> Self {
        Self {
            log,
            user_index: None,
            fail_submit: false,
        }
    }
}

impl VirtualTarget for RecordingTarget {
    fn submit(&mut self, state: &GamepadState) -> padmux_vpad::Result<()> {
        if self.fail_submit {
            return Err(VpadError::Target("bus busy".into()));
        }
        self.log.lock().unwrap().submitted.push(*state);
        Ok(())
    }

    fn register_feedback(&mut self, handler: FeedbackHandler) -> padmux_vpad::Result<()> {
        let mut log = self.log.lock().unwrap();
        log.handler = Some(handler);
        log.events.push("register");
        Ok(())
    }

    fn unregister_feedback(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.handler = None;
        log.events.push("unregister");
    }

    fn user_index(&mut self) -> Option<SlotIndex> {
        self.user_index
    }
}

impl Drop for RecordingTarget {
    fn drop(&mut self) {
        if let Ok(mut log) = self.log.lock() {
            log.events.push("drop");
        }
    }
}

/// Bus handing out [`RecordingTarget`]s that share one log.
pub(crate) struct RecordingBus {
    pub(crate) log: SharedLog,
    pub(crate) available: bool,
    pub(crate) user_index: Option<SlotIndex>,
    /// Slots the fake bus plugs into when it connects.
    pub(crate) plug_into: Option<(Arc<FakeSlots>, u8)>,
}

impl RecordingBus {
    pub(crate) fn new() -> Self {
        Self {
            log: SharedLog::default(),
            available: true,
            user_index: None,
            plug_into: None,
        }
    }
}

impl VirtualBus for RecordingBus {
    fn connect(&self) -> padmux_vpad::Result<Box<dyn VirtualTarget>> {
        if !self.available {
            return Err(VpadError::DriverUnavailable("bus not installed".into()));
        }
        if let Some((slots, i)) = &self.plug_into {
            slots.idle(*i);
        }
        let mut target = RecordingTarget::new(Arc::clone(&self.log));
        target.user_index = self.user_index;
        Ok(Box::new(target))
    }
}
