//! Slow controller polling that drives a host UI: D-pad navigation,
//! face-button actions and a human-readable status report.
//!
//! Runs next to the aggregator, never through it. Slots occupied by the
//! virtual controller are listed but never navigate, otherwise every input
//! would arrive twice.

use std::fmt;
use std::sync::Arc;

use padmux_gamepad::{Button, ButtonSet, SlotIndex, SlotSet, SlotSource, SLOT_COUNT};
use smallvec::SmallVec;

/// Held D-pad directions of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Direction {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Direction {
    fn from_pressed(pressed: ButtonSet) -> Self {
        Self {
            up: pressed.contains(Button::DPadUp),
            down: pressed.contains(Button::DPadDown),
            left: pressed.contains(Button::DPadLeft),
            right: pressed.contains(Button::DPadRight),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Direction(Direction),
    /// One of the action buttons (A, B, X, Y, Start).
    Button(Button),
}

const ACTION_BUTTONS: [Button; 5] = [Button::A, Button::B, Button::X, Button::Y, Button::Start];

/// Everything the host needs to react to one poll.
pub type NavEvents = SmallVec<[NavEvent; 8]>;

/// What the host should do with navigation output.
pub trait NavigationHost {
    /// Whether the host window is active.
    fn is_focused(&self) -> bool;

    fn navigate(&mut self, event: NavEvent);

    fn set_status(&mut self, report: &StatusReport);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotStatus {
    pub slot: SlotIndex,
    /// Occupied by the virtual controller.
    pub ignored: bool,
    pub pressed: ButtonSet,
}

/// Status of the virtual controller and every connected slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusReport {
    pub virtual_slots: SlotSet,
    pub slots: SmallVec<[SlotStatus; SLOT_COUNT]>,
}

impl StatusReport {
    /// Headline: virtual controller state, then whether anything is connected.
    pub fn summary(&self) -> String {
        let virtual_line = if self.virtual_slots.is_empty() {
            "Virtual controller: disabled".to_string()
        } else {
            let slots: Vec<String> = self.virtual_slots.iter().map(|s| s.to_string()).collect();
            format!("Virtual controller: enabled (slot {})", slots.join(", "))
        };
        let connected = if self.slots.is_empty() {
            "No controllers connected"
        } else {
            "Controller(s) connected"
        };
        format!("{virtual_line}\n{connected}")
    }

    /// One line per connected slot with its held buttons.
    pub fn slot_lines(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|status| {
                let label = if status.ignored { "Aggregator" } else { "Controller" };
                let names: Vec<&str> = status.pressed.iter().map(Button::name).collect();
                let pressed = if names.is_empty() {
                    "No buttons pressed".to_string()
                } else {
                    names.join(", ")
                };
                format!("{label} ({}): {pressed}", status.slot)
            })
            .collect()
    }
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())?;
        for line in self.slot_lines() {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

pub struct Navigator {
    source: Arc<dyn SlotSource>,
    ignored: SlotSet,
    require_focus: bool,
}

impl Navigator {
    pub fn new(source: Arc<dyn SlotSource>, require_focus: bool) -> Self {
        Self {
            source,
            ignored: SlotSet::empty(),
            require_focus,
        }
    }

    /// Slots that are shown but never navigate. A set covering every slot
    /// would leave nothing to navigate with and is treated as empty.
    pub fn set_ignored(&mut self, slots: SlotSet) {
        self.ignored = if slots.count() as usize >= SLOT_COUNT {
            SlotSet::empty()
        } else {
            slots
        };
    }

    pub fn ignored(&self) -> SlotSet {
        self.ignored
    }

    /// Read every slot once. Held directions and action buttons are
    /// reported on every poll for as long as they stay held.
    pub fn poll(&self) -> (NavEvents, StatusReport) {
        let mut events = NavEvents::new();
        let mut report = StatusReport {
            virtual_slots: self.ignored,
            slots: SmallVec::new(),
        };

        for slot in SlotIndex::all() {
            let Some(snapshot) = self.source.read(slot) else {
                continue;
            };
            let pressed = snapshot.pad.pressed();
            let ignored = self.ignored.contains(slot);
            report.slots.push(SlotStatus {
                slot,
                ignored,
                pressed,
            });
            if ignored {
                continue;
            }

            let direction = Direction::from_pressed(pressed);
            if !direction.is_empty() {
                events.push(NavEvent::Direction(direction));
            }
            events.extend(
                ACTION_BUTTONS
                    .into_iter()
                    .filter(|button| pressed.contains(*button))
                    .map(NavEvent::Button),
            );
        }
        (events, report)
    }

    /// Poll and hand the results to `host`. Does nothing while the host is
    /// not focused, if focus is required. Returns whether a poll happened.
    pub fn drive(&self, host: &mut impl NavigationHost) -> bool {
        if self.require_focus && !host.is_focused() {
            return false;
        }
        let (events, report) = self.poll();
        for event in events {
            host.navigate(event);
        }
        host.set_status(&report);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use padmux_gamepad::{ControllerSnapshot, GamepadState};

    use super::*;

    #[derive(Default)]
    struct Slots([Mutex<Option<u16>>; SLOT_COUNT]);

    impl Slots {
        fn set(&self, i: usize, buttons: u16) {
            *self.0[i].lock().unwrap() = Some(buttons);
        }
    }

    impl SlotSource for Slots {
        fn read(&self, slot: SlotIndex) -> Option<ControllerSnapshot> {
            let buttons = (*self.0[slot.get() as usize].lock().unwrap())?;
            Some(ControllerSnapshot::new(
                0,
                GamepadState {
                    buttons,
                    ..GamepadState::default()
                },
            ))
        }

        fn set_vibration(&self, _: SlotIndex, _: u16, _: u16) -> padmux_gamepad::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct Host {
        focused: bool,
        events: Vec<NavEvent>,
        status: Option<String>,
    }

    impl NavigationHost for Host {
        fn is_focused(&self) -> bool {
            self.focused
        }

        fn navigate(&mut self, event: NavEvent) {
            self.events.push(event);
        }

        fn set_status(&mut self, report: &StatusReport) {
            self.status = Some(report.to_string());
        }
    }

    fn slot(i: u8) -> SlotIndex {
        SlotIndex::new(i).unwrap()
    }

    fn navigator(slots: &Arc<Slots>) -> Navigator {
        let source: Arc<dyn SlotSource> = slots.clone();
        Navigator::new(source, true)
    }

    #[test]
    fn nothing_connected() {
        let slots = Arc::new(Slots::default());
        let (events, report) = navigator(&slots).poll();
        assert!(events.is_empty());
        assert_eq!(
            report.to_string(),
            "Virtual controller: disabled\nNo controllers connected"
        );
    }

    #[test]
    fn held_buttons_repeat_every_poll() {
        let slots = Arc::new(Slots::default());
        slots.set(0, Button::DPadUp.mask() | Button::DPadLeft.mask() | Button::A.mask());
        let navigator = navigator(&slots);

        for _ in 0..3 {
            let (events, _) = navigator.poll();
            assert_eq!(
                events.as_slice(),
                [
                    NavEvent::Direction(Direction {
                        up: true,
                        left: true,
                        ..Direction::default()
                    }),
                    NavEvent::Button(Button::A),
                ]
            );
        }
    }

    #[test]
    fn ignored_slots_are_listed_but_silent() {
        let slots = Arc::new(Slots::default());
        slots.set(1, Button::B.mask() | Button::Start.mask());
        slots.set(2, 0);
        let mut navigator = navigator(&slots);
        navigator.set_ignored([slot(1)].into_iter().collect());

        let (events, report) = navigator.poll();
        assert!(events.is_empty());
        assert_eq!(
            report.to_string(),
            "Virtual controller: enabled (slot 1)\n\
             Controller(s) connected\n\
             Aggregator (1): START, B\n\
             Controller (2): No buttons pressed"
        );
    }

    #[test]
    fn ignoring_every_slot_ignores_none() {
        let slots = Arc::new(Slots::default());
        let mut navigator = navigator(&slots);
        navigator.set_ignored(SlotIndex::all().collect());
        assert!(navigator.ignored().is_empty());

        navigator.set_ignored([slot(0), slot(3)].into_iter().collect());
        assert_eq!(navigator.ignored().count(), 2);
    }

    #[test]
    fn unfocused_host_gets_nothing() {
        let slots = Arc::new(Slots::default());
        slots.set(0, Button::X.mask());
        let navigator = navigator(&slots);
        let mut host = Host::default();

        assert!(!navigator.drive(&mut host));
        assert!(host.events.is_empty());
        assert!(host.status.is_none());

        host.focused = true;
        assert!(navigator.drive(&mut host));
        assert_eq!(host.events, vec![NavEvent::Button(Button::X)]);
        assert!(host.status.unwrap().ends_with("Controller (0): X"));
    }

    #[test]
    fn focus_can_be_optional() {
        let slots = Arc::new(Slots::default());
        slots.set(3, Button::DPadDown.mask());
        let source: Arc<dyn SlotSource> = slots.clone();
        let navigator = Navigator::new(source, false);
        let mut host = Host::default();

        assert!(navigator.drive(&mut host));
        assert_eq!(
            host.events,
            vec![NavEvent::Direction(Direction {
                down: true,
                ..Direction::default()
            })]
        );
    }
}
