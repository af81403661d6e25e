use std::sync::Arc;
use std::time::{Duration, Instant};

use padmux_gamepad::{ControllerSnapshot, Deadzones, SlotIndex, SlotSet, SlotSource};

use crate::owner::OwnerCell;

/// Decides which physical slot drives the virtual controller.
///
/// An owner stays put while it is active, and for `idle_hold` after its last
/// activity. When it is released (or there is none) slots are scanned in
/// index order: the first active one wins, otherwise the lowest connected one
/// becomes a provisional owner.
pub struct Arbiter {
    source: Arc<dyn SlotSource>,
    deadzones: Deadzones,
    idle_hold: Duration,
    excluded: SlotSet,
    owner: Option<SlotIndex>,
    last_activity: Option<Instant>,
    shared: Arc<OwnerCell>,
}

impl Arbiter {
    pub fn new(
        source: Arc<dyn SlotSource>,
        deadzones: Deadzones,
        idle_hold: Duration,
        shared: Arc<OwnerCell>,
    ) -> Self {
        Self {
            source,
            deadzones,
            idle_hold,
            excluded: SlotSet::empty(),
            owner: None,
            last_activity: None,
            shared,
        }
    }

    /// Slots never considered for ownership (the virtual pad's own slot).
    pub fn excluding(mut self, slots: SlotSet) -> Self {
        self.set_excluded(slots);
        self
    }

    pub fn set_excluded(&mut self, slots: SlotSet) {
        self.excluded = slots;
        if self.owner.is_some_and(|owner| slots.contains(owner)) {
            self.assign(None, None);
        }
    }

    pub fn owner(&self) -> Option<SlotIndex> {
        self.owner
    }

    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }

    /// Run one arbitration step at `now` and return the owner with the
    /// snapshot read for it this tick.
    pub fn tick(&mut self, now: Instant) -> Option<(SlotIndex, ControllerSnapshot)> {
        if let Some(owner) = self.owner {
            if let Some(snapshot) = self.source.read(owner) {
                if self.deadzones.is_active(&snapshot.pad) {
                    self.assign(Some(owner), Some(now));
                    return Some((owner, snapshot));
                }
                if self.within_hold(now) {
                    return Some((owner, snapshot));
                }
            } else {
                log::trace!("owner slot {owner} did not answer");
            }
        }

        let found = self.search();
        match found {
            Some((slot, snapshot, active)) => {
                self.assign(Some(slot), active.then_some(now));
                Some((slot, snapshot))
            }
            None => {
                self.assign(None, None);
                None
            }
        }
    }

    fn within_hold(&self, now: Instant) -> bool {
        self.last_activity
            .is_some_and(|at| now.saturating_duration_since(at) < self.idle_hold)
    }

    fn search(&self) -> Option<(SlotIndex, ControllerSnapshot, bool)> {
        let mut fallback = None;
        for slot in SlotIndex::all() {
            if self.excluded.contains(slot) {
                continue;
            }
            let Some(snapshot) = self.source.read(slot) else {
                continue;
            };
            if self.deadzones.is_active(&snapshot.pad) {
                return Some((slot, snapshot, true));
            }
            if fallback.is_none() {
                fallback = Some((slot, snapshot, false));
            }
        }
        fallback
    }

    fn assign(&mut self, owner: Option<SlotIndex>, last_activity: Option<Instant>) {
        if owner != self.owner {
            match owner {
                Some(slot) => log::debug!("slot {slot} now owns the virtual controller"),
                None => log::debug!("virtual controller has no owner"),
            }
        }
        self.owner = owner;
        self.last_activity = last_activity;
        self.shared.store(owner, last_activity);
    }
}
