use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use padmux_gamepad::{SlotIndex, SlotSet, SlotSource};
use padmux_vpad::VirtualBus;

use crate::arbiter::Arbiter;
use crate::binding::VirtualPadBinding;
use crate::config::AggregatorConfig;
use crate::error::{Error, Result};
use crate::feedback::FeedbackRouter;
use crate::owner::{OwnerCell, OwnerState};

/// Owns the virtual controller and the thread that keeps it in sync with the
/// physical slots.
pub struct Aggregator {
    config: AggregatorConfig,
    source: Arc<dyn SlotSource>,
    bus: Box<dyn VirtualBus>,
    running: Option<Running>,
}

struct Running {
    stop: Arc<AtomicBool>,
    done_rx: Receiver<()>,
    thread: JoinHandle<()>,
    binding: Arc<Mutex<VirtualPadBinding>>,
    owner: Arc<OwnerCell>,
    virtual_slots: SlotSet,
}

impl Aggregator {
    /// Validates `config`. Nothing is plugged in until [`start`](Self::start).
    pub fn new(
        config: AggregatorConfig,
        source: Arc<dyn SlotSource>,
        bus: Box<dyn VirtualBus>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            source,
            bus,
            running: None,
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Plug in the virtual controller and start the polling loop.
    ///
    /// Fails with [`Error::DriverUnavailable`] when the host has no virtual
    /// bus; the aggregator then stays stopped and slot queries keep working.
    pub fn start(&mut self) -> Result<()> {
        if self.running.is_some() {
            return Err(Error::AlreadyRunning);
        }

        let before = self.source.connected();
        let target = self.bus.connect()?;
        let mut binding = VirtualPadBinding::new(target, self.config.deadzones());
        let virtual_slots = match binding.user_index() {
            Some(slot) => [slot].into_iter().collect(),
            None => self.source.connected().difference(&before),
        };
        if !virtual_slots.is_empty() {
            log::debug!("virtual controller occupies slots {virtual_slots:?}");
        }

        let owner = Arc::new(OwnerCell::new(Instant::now()));
        let router = FeedbackRouter::new(Arc::clone(&owner), Arc::clone(&self.source));
        if let Err(e) = binding.register_feedback(router.into_handler()) {
            log::warn!("rumble forwarding disabled: {e}");
        }

        let arbiter = Arbiter::new(
            Arc::clone(&self.source),
            self.config.deadzones(),
            self.config.idle_hold(),
            Arc::clone(&owner),
        )
        .excluding(virtual_slots);

        let binding = Arc::new(Mutex::new(binding));
        let stop = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = bounded::<()>(1);
        let thread = match start_loop_thread(
            arbiter,
            Arc::clone(&binding),
            Arc::clone(&stop),
            self.config.period(),
            done_tx,
        ) {
            Ok(handle) => handle,
            Err(e) => {
                lock(&binding).teardown();
                return Err(Error::Spawn(e));
            }
        };

        log::info!(
            "aggregator started at {} Hz, idle hold {} ms",
            self.config.poll_hz,
            self.config.idle_hold_ms
        );
        self.running = Some(Running {
            stop,
            done_rx,
            thread,
            binding,
            owner,
            virtual_slots,
        });
        Ok(())
    }

    /// Stop the loop, release the virtual controller to neutral and unplug
    /// it. Does nothing when not running.
    ///
    /// Waits at most `stop_timeout_ms` for the loop. A loop that misses the
    /// deadline is left detached, and the device is still released and torn
    /// down under the binding lock so its late iterations push nothing.
    pub fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.stop.store(true, Ordering::Release);

        match running.done_rx.recv_timeout(self.config.stop_timeout()) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                if running.thread.join().is_err() {
                    log::error!("aggregator loop panicked");
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                log::warn!(
                    "aggregator loop did not stop within {} ms",
                    self.config.stop_timeout_ms
                );
            }
        }

        let mut binding = lock(&running.binding);
        if let Err(e) = binding.send_neutral() {
            log::debug!("virtual controller not released: {e}");
        }
        binding.teardown();
        log::info!("aggregator stopped");
    }

    /// Release every button and center every axis on the virtual controller.
    pub fn send_neutral(&self) -> Result<()> {
        let running = self.running.as_ref().ok_or(Error::NotRunning)?;
        lock(&running.binding).send_neutral()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Current owner slot, `None` when stopped or nothing is connected.
    pub fn owner(&self) -> Option<SlotIndex> {
        self.owner_state().slot
    }

    pub fn owner_state(&self) -> OwnerState {
        self.running
            .as_ref()
            .map(|running| running.owner.load())
            .unwrap_or_default()
    }

    /// Host slots taken by the virtual controller itself. Hosts hide these
    /// from direct use.
    pub fn virtual_slots(&self) -> SlotSet {
        self.running
            .as_ref()
            .map(|running| running.virtual_slots)
            .unwrap_or_default()
    }

    /// Physical slots answering right now. Works whether or not the
    /// aggregator runs.
    pub fn connected_slots(&self) -> SlotSet {
        self.source.connected()
    }
}

impl Drop for Aggregator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(binding: &Mutex<VirtualPadBinding>) -> std::sync::MutexGuard<'_, VirtualPadBinding> {
    binding.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Starts the polling loop. The loop checks `stop` once per tick and signals
/// `done_tx` on exit.
fn start_loop_thread(
    mut arbiter: Arbiter,
    binding: Arc<Mutex<VirtualPadBinding>>,
    stop: Arc<AtomicBool>,
    period: Duration,
    done_tx: Sender<()>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("padmux-aggregator".into())
        .spawn(move || {
            let mut next = Instant::now();
            while !stop.load(Ordering::Acquire) {
                step(&mut arbiter, &binding, Instant::now());

                next += period;
                let now = Instant::now();
                match next.checked_duration_since(now) {
                    Some(wait) => thread::sleep(wait),
                    // Overran the period; don't try to catch up.
                    None => next = now,
                }
            }
            let _ = done_tx.send(());
        })
}

/// One tick: arbitrate, then push the owner's state if it changed.
/// Returns whether the device was updated.
pub(crate) fn step(arbiter: &mut Arbiter, binding: &Mutex<VirtualPadBinding>, now: Instant) -> bool {
    let Some((_, snapshot)) = arbiter.tick(now) else {
        return false;
    };
    match lock(binding).update(&snapshot) {
        Ok(pushed) => pushed,
        Err(e) => {
            log::debug!("virtual controller update skipped: {e}");
            false
        }
    }
}
