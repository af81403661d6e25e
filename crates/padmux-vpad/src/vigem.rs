use std::sync::{Arc, Mutex};

use padmux_gamepad::{GamepadState, SlotIndex};
use vigem_client::{Client, TargetId, XButtons, XGamepad, XNotification, Xbox360Wired};

use crate::error::{Error, Result};
use crate::target::{Feedback, FeedbackHandler, VirtualBus, VirtualTarget};

/// ViGEmBus kernel driver, exposing virtual Xbox 360 wired controllers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViGEmBus;

impl VirtualBus for ViGEmBus {
    fn connect(&self) -> Result<Box<dyn VirtualTarget>> {
        let client =
            Client::connect().map_err(|e| Error::DriverUnavailable(format!("{e:?}")))?;
        let mut target = Xbox360Wired::new(client, TargetId::XBOX360_WIRED);
        target
            .plugin()
            .map_err(|e| Error::Target(format!("plugin failed: {e:?}")))?;
        target
            .wait_ready()
            .map_err(|e| Error::Target(format!("target not ready: {e:?}")))?;
        log::info!("virtual Xbox 360 controller plugged in");
        Ok(Box::new(ViGEmTarget {
            target,
            handler: Arc::new(Mutex::new(None)),
            listening: false,
        }))
    }
}

type SharedHandler = Arc<Mutex<Option<FeedbackHandler>>>;

struct ViGEmTarget {
    target: Xbox360Wired<Client>,
    handler: SharedHandler,
    listening: bool,
}

impl VirtualTarget for ViGEmTarget {
    fn submit(&mut self, state: &GamepadState) -> Result<()> {
        let report = XGamepad {
            buttons: XButtons { raw: state.buttons },
            left_trigger: state.left_trigger,
            right_trigger: state.right_trigger,
            thumb_lx: state.thumb_lx,
            thumb_ly: state.thumb_ly,
            thumb_rx: state.thumb_rx,
            thumb_ry: state.thumb_ry,
        };
        self.target
            .update(&report)
            .map_err(|e| Error::Target(format!("update failed: {e:?}")))
    }

    fn register_feedback(&mut self, handler: FeedbackHandler) -> Result<()> {
        if let Ok(mut slot) = self.handler.lock() {
            *slot = Some(handler);
        }
        if self.listening {
            return Ok(());
        }

        let notification = self
            .target
            .request_notification()
            .map_err(|e| Error::Target(format!("notification request failed: {e:?}")))?;
        let shared = Arc::clone(&self.handler);
        // The thread ends on its own once the target is unplugged.
        let _ = notification.spawn_thread(move |_, data: XNotification| {
            if let Ok(mut slot) = shared.lock() {
                if let Some(handler) = slot.as_mut() {
                    handler(Feedback {
                        large_motor: data.large_motor,
                        small_motor: data.small_motor,
                        led_number: data.led_number,
                    });
                }
            }
        });
        self.listening = true;
        Ok(())
    }

    fn unregister_feedback(&mut self) {
        if let Ok(mut slot) = self.handler.lock() {
            *slot = None;
        }
    }

    fn user_index(&mut self) -> Option<SlotIndex> {
        let index = self.target.get_user_index().ok()?;
        u8::try_from(index).ok().and_then(SlotIndex::new)
    }
}

impl Drop for ViGEmTarget {
    fn drop(&mut self) {
        self.unregister_feedback();
        if let Err(e) = self.target.unplug() {
            log::debug!("virtual controller unplug failed: {e:?}");
        }
    }
}
