//! Host intents and the channel that carries them
//!
//! The channel is built on `critical-section` and `heapless::Deque`, so the
//! host may submit from any task or interrupt while the driver ticks.
//! Consecutive targets are coalesced: only the latest one matters, because
//! the sequencer always chases the newest target anyway.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

/// Desired light state as requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TargetState {
    pub power: bool,
    /// Brightness in `[0, 1]`, `None` keeps the current rung
    pub brightness: Option<f32>,
    /// Color temperature in mireds, `None` keeps the current rung
    pub color_temp_mireds: Option<f32>,
}

impl TargetState {
    /// Target that only changes power
    pub const fn power(on: bool) -> Self {
        Self {
            power: on,
            brightness: None,
            color_temp_mireds: None,
        }
    }

    #[must_use]
    pub const fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = Some(brightness);
        self
    }

    #[must_use]
    pub const fn with_color_temp(mut self, mireds: f32) -> Self {
        self.color_temp_mireds = Some(mireds);
        self
    }
}

/// Request from the host to the driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightIntent {
    /// Drive the lamp towards a new state
    Target(TargetState),
    /// Push the lamp against its known extremes to correct drift
    Resync,
    /// Adopt a restored state as the estimate without sending anything
    Restore(TargetState),
    /// Correct the power estimate without sending anything
    OverridePower(bool),
}

/// Error returned when the channel is full.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrySendError(pub LightIntent);

/// Error returned when the channel is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryReceiveError;

/// Bounded intent channel shared between the host and the driver.
pub struct IntentChannel<const SIZE: usize> {
    inner: Mutex<RefCell<Deque<LightIntent, SIZE>>>,
}

impl<const SIZE: usize> IntentChannel<SIZE> {
    /// Create a new empty channel.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Get a sender handle for this channel.
    pub const fn sender(&self) -> IntentSender<'_, SIZE> {
        IntentSender { channel: self }
    }

    /// Get a receiver handle for this channel.
    pub const fn receiver(&self) -> IntentReceiver<'_, SIZE> {
        IntentReceiver { channel: self }
    }

    /// Queue an intent.
    ///
    /// A target replaces a target still waiting at the back of the queue, so
    /// submitting targets only fails when the queue is full of other
    /// intents. Returns `Err(TrySendError(intent))` if the channel is full.
    pub fn try_send(&self, intent: LightIntent) -> Result<(), TrySendError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            if let LightIntent::Target(_) = intent {
                if let Some(last) = queue.back_mut() {
                    if matches!(last, LightIntent::Target(_)) {
                        *last = intent;
                        return Ok(());
                    }
                }
            }
            queue.push_back(intent).map_err(TrySendError)
        })
    }

    /// Take the oldest queued intent.
    ///
    /// Returns `Err(TryReceiveError)` if the channel is empty.
    pub fn try_receive(&self) -> Result<LightIntent, TryReceiveError> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front().ok_or(TryReceiveError)
        })
    }

    /// Number of intents waiting to be processed
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const SIZE: usize> Default for IntentChannel<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

/// Host side handle of an [`IntentChannel`].
#[derive(Clone, Copy)]
pub struct IntentSender<'a, const SIZE: usize> {
    channel: &'a IntentChannel<SIZE>,
}

impl<const SIZE: usize> IntentSender<'_, SIZE> {
    pub fn try_send(&self, intent: LightIntent) -> Result<(), TrySendError> {
        self.channel.try_send(intent)
    }

    /// Request a new target state
    pub fn submit_target(&self, target: TargetState) -> Result<(), TrySendError> {
        self.try_send(LightIntent::Target(target))
    }

    /// Request a drift-correcting resync
    pub fn resync(&self) -> Result<(), TrySendError> {
        self.try_send(LightIntent::Resync)
    }
}

/// Driver side handle of an [`IntentChannel`].
#[derive(Clone, Copy)]
pub struct IntentReceiver<'a, const SIZE: usize> {
    channel: &'a IntentChannel<SIZE>,
}

impl<const SIZE: usize> IntentReceiver<'_, SIZE> {
    pub fn try_receive(&self) -> Result<LightIntent, TryReceiveError> {
        self.channel.try_receive()
    }
}
