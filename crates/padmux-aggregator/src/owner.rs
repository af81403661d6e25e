use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use padmux_gamepad::SlotIndex;

// Layout: top byte holds `slot + 1` (0 = no owner), the rest holds the last
// activity in milliseconds since the cell's epoch.
const SLOT_SHIFT: u32 = 56;
const MILLIS_MASK: u64 = (1 << SLOT_SHIFT) - 1;

/// Snapshot of who owns the virtual device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OwnerState {
    pub slot: Option<SlotIndex>,
    /// Last detected activity of the owner, relative to the cell's epoch.
    /// `None` when the owner was picked without any input (fallback).
    pub last_activity: Option<Duration>,
}

/// Owner state shared between the loop thread (the only writer) and the
/// feedback path. Both fields live in one atomic word, so a reader always
/// sees a consistent pair without taking a lock.
#[derive(Debug)]
pub struct OwnerCell {
    state: AtomicU64,
    epoch: Instant,
}

impl OwnerCell {
    pub fn new(epoch: Instant) -> Self {
        Self {
            state: AtomicU64::new(0),
            epoch,
        }
    }

    /// Load the current owner and its last activity.
    #[inline]
    pub fn load(&self) -> OwnerState {
        decode(self.state.load(Ordering::Acquire))
    }

    /// Load only the owning slot.
    #[inline]
    pub fn slot(&self) -> Option<SlotIndex> {
        self.load().slot
    }

    pub(crate) fn store(&self, slot: Option<SlotIndex>, last_activity: Option<Instant>) {
        let since = last_activity.map(|at| at.saturating_duration_since(self.epoch));
        self.state.store(encode(slot, since), Ordering::Release);
    }
}

fn encode(slot: Option<SlotIndex>, last_activity: Option<Duration>) -> u64 {
    let Some(slot) = slot else {
        return 0;
    };
    // Zero millis is reserved for "no activity"; shift real values by one.
    let millis = last_activity
        .map(|d| {
            u64::try_from(d.as_millis())
                .unwrap_or(u64::MAX)
                .saturating_add(1)
                .min(MILLIS_MASK)
        })
        .unwrap_or(0);
    ((u64::from(slot.get()) + 1) << SLOT_SHIFT) | millis
}

fn decode(raw: u64) -> OwnerState {
    let tag = (raw >> SLOT_SHIFT) as u8;
    let Some(slot) = tag.checked_sub(1).and_then(SlotIndex::new) else {
        return OwnerState::default();
    };
    let millis = raw & MILLIS_MASK;
    OwnerState {
        slot: Some(slot),
        last_activity: millis.checked_sub(1).map(Duration::from_millis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(i: u8) -> SlotIndex {
        SlotIndex::new(i).unwrap()
    }

    #[test]
    fn starts_without_owner() {
        let cell = OwnerCell::new(Instant::now());
        assert_eq!(cell.load(), OwnerState::default());
        assert_eq!(cell.slot(), None);
    }

    #[test]
    fn stores_slot_and_activity_together() {
        let epoch = Instant::now();
        let cell = OwnerCell::new(epoch);

        cell.store(Some(slot(3)), Some(epoch + Duration::from_millis(1234)));
        assert_eq!(
            cell.load(),
            OwnerState {
                slot: Some(slot(3)),
                last_activity: Some(Duration::from_millis(1234)),
            }
        );
    }

    #[test]
    fn activity_at_epoch_is_not_confused_with_none() {
        let epoch = Instant::now();
        let cell = OwnerCell::new(epoch);

        cell.store(Some(slot(0)), Some(epoch));
        assert_eq!(cell.load().last_activity, Some(Duration::ZERO));

        cell.store(Some(slot(0)), None);
        assert_eq!(cell.load().last_activity, None);
        assert_eq!(cell.slot(), Some(slot(0)));
    }

    #[test]
    fn clearing_owner_drops_activity() {
        let epoch = Instant::now();
        let cell = OwnerCell::new(epoch);
        cell.store(Some(slot(1)), Some(epoch));
        cell.store(None, Some(epoch));
        assert_eq!(cell.load(), OwnerState::default());
    }
}
