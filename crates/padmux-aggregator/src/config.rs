use std::time::Duration;

use padmux_gamepad::Deadzones;

use crate::error::{Error, Result};

const MAX_POLL_HZ: u32 = 1000;
const MAX_IDLE_HOLD_MS: u64 = 60_000;

/// Construction parameters of an [`Aggregator`](crate::Aggregator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Polling rate of the aggregator loop.
    pub poll_hz: u32,
    /// How long an owner that went idle keeps ownership.
    pub idle_hold_ms: u64,
    /// Stick deadzone radius in raw axis units.
    pub stick_deadzone: u16,
    /// Trigger deadzone floor in raw units.
    pub trigger_deadzone: u8,
    /// Upper bound on how long `stop` waits for the loop thread.
    pub stop_timeout_ms: u64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        let deadzones = Deadzones::default();
        Self {
            poll_hz: 250,
            idle_hold_ms: 500,
            stick_deadzone: deadzones.stick,
            trigger_deadzone: deadzones.trigger,
            stop_timeout_ms: 1000,
        }
    }
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.poll_hz == 0 || self.poll_hz > MAX_POLL_HZ {
            return Err(Error::InvalidConfig(format!(
                "poll_hz must be between 1 and {MAX_POLL_HZ}, got {}",
                self.poll_hz
            )));
        }
        if self.idle_hold_ms > MAX_IDLE_HOLD_MS {
            return Err(Error::InvalidConfig(format!(
                "idle_hold_ms must be at most {MAX_IDLE_HOLD_MS}, got {}",
                self.idle_hold_ms
            )));
        }
        if self.stop_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "stop_timeout_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Time between two loop ticks.
    pub fn period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.poll_hz.max(1)))
    }

    pub fn idle_hold(&self) -> Duration {
        Duration::from_millis(self.idle_hold_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    pub fn deadzones(&self) -> Deadzones {
        Deadzones::new(self.stick_deadzone, self.trigger_deadzone)
    }
}
