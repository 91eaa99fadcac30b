//! Remote light driver
//!
//! Couples the intent channel, the sequencer and a radio transport. The host
//! calls [`RemoteLight::tick`] from its main loop; nothing in here blocks or
//! sleeps, the returned [`TickResult`] tells the caller how long it may wait.
//!
//! ```ignore
//! static INTENTS: IntentChannel<4> = IntentChannel::new();
//!
//! let mut light = RemoteLight::new(INTENTS.receiver(), config, transport);
//!
//! loop {
//!     let result = light.tick(Instant::now());
//!     if result.completed {
//!         publish(light.snapshot());
//!     }
//!     // Platform-specific sleep
//!     sleep(result.sleep_duration.unwrap_or(IDLE_POLL));
//! }
//! ```

use embassy_time::{Duration, Instant};

use crate::RadioTransport;
use crate::command::StepCommand;
use crate::config::RemoteLightConfig;
use crate::intent::{IntentReceiver, LightIntent, TargetState};
use crate::ladder::LadderState;
use crate::packet::{self, Opcode};
use crate::sequencer::{CommandSequencer, SequencerState};

/// Result of a driver tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// Command released during this tick
    pub sent: Option<StepCommand>,
    /// The transport reported a failure for `sent`
    pub transport_failed: bool,
    /// The sequencer went idle during this tick
    pub completed: bool,
    /// Sequencer state after the tick
    pub state: SequencerState,
    /// Time until the next command is due, `None` when idle
    pub sleep_duration: Option<Duration>,
}

/// Estimate of the lamp expressed in host units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSnapshot {
    pub power: bool,
    pub brightness: f32,
    pub color_temp_mireds: f32,
}

/// Drives a remote-controlled lamp through a [`RadioTransport`]
pub struct RemoteLight<'a, T: RadioTransport, const INTENT_CHANNEL_SIZE: usize> {
    // External dependencies and configuration
    intents: IntentReceiver<'a, INTENT_CHANNEL_SIZE>,
    transport: T,
    config: RemoteLightConfig,

    // Internal state
    sequencer: CommandSequencer,
    failed_sends: u32,
}

impl<'a, T: RadioTransport, const INTENT_CHANNEL_SIZE: usize>
    RemoteLight<'a, T, INTENT_CHANNEL_SIZE>
{
    /// Create a new driver
    ///
    /// The configuration is expected to be validated already, see
    /// [`RemoteLightConfig::validate`].
    pub fn new(
        intents: IntentReceiver<'a, INTENT_CHANNEL_SIZE>,
        config: RemoteLightConfig,
        transport: T,
    ) -> Self {
        config.log();
        Self {
            intents,
            transport,
            sequencer: CommandSequencer::new(&config),
            config,
            failed_sends: 0,
        }
    }

    /// Advance the driver
    ///
    /// Applies pending intents, then releases at most one command. A tick
    /// that starts with presses queued and ends idle is reported as
    /// completed, even if an intent emptied the queue without a press.
    pub fn tick(&mut self, now: Instant) -> TickResult {
        let was_sequencing = !self.sequencer.is_idle();
        self.process_intents();

        let sent = self.sequencer.poll(now);
        let transport_failed = match sent {
            Some(command) => !self.send(command),
            None => false,
        };

        TickResult {
            sent,
            transport_failed,
            completed: (was_sequencing || sent.is_some()) && self.sequencer.is_idle(),
            state: self.sequencer.sequencer_state(),
            sleep_duration: self.sequencer.time_until_next(now),
        }
    }

    /// Drive the lamp towards a new state
    ///
    /// Returns the number of queued presses.
    pub fn submit_target(&mut self, target: &TargetState) -> usize {
        self.sequencer.submit(target)
    }

    /// Push the lamp against its known extremes to correct drift
    pub fn resync(&mut self) -> bool {
        self.sequencer.resync()
    }

    /// Adopt a restored state without sending anything
    pub fn restore(&mut self, target: &TargetState) -> LadderState {
        self.sequencer.restore(target)
    }

    /// Correct the power estimate without sending anything
    pub fn override_power(&mut self, on: bool) {
        self.sequencer.override_power(on);
    }

    /// Current estimate in host units
    pub fn snapshot(&self) -> LightSnapshot {
        let state = self.sequencer.state();
        let resolver = self.sequencer.resolver();
        LightSnapshot {
            power: state.power_on,
            brightness: resolver.brightness_of(state.brightness_index),
            color_temp_mireds: resolver.mireds_of(state.color_temp_index),
        }
    }

    pub const fn sequencer(&self) -> &CommandSequencer {
        &self.sequencer
    }

    pub const fn config(&self) -> &RemoteLightConfig {
        &self.config
    }

    /// Sends the transport reported as failed
    pub const fn failed_sends(&self) -> u32 {
        self.failed_sends
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Process pending intents from the channel (non-blocking)
    fn process_intents(&mut self) {
        while let Ok(intent) = self.intents.try_receive() {
            match intent {
                LightIntent::Target(target) => {
                    self.sequencer.submit(&target);
                }
                LightIntent::Resync => {
                    self.sequencer.resync();
                }
                LightIntent::Restore(target) => {
                    self.sequencer.restore(&target);
                }
                LightIntent::OverridePower(on) => {
                    self.sequencer.override_power(on);
                }
            }
        }
    }

    /// Build and send the frame for a released command
    ///
    /// Failures are only reported, the estimate has already moved on.
    fn send(&mut self, command: StepCommand) -> bool {
        let address = self.config.device_address;
        let frame = packet::build(&address, &self.config.device_payload, Opcode::from(command));
        match self.transport.send(&address, &frame) {
            Ok(()) => true,
            Err(error) => {
                self.failed_sends = self.failed_sends.wrapping_add(1);
                log::warn!("Send of {} failed: {:?}", command.as_str(), error);
                false
            }
        }
    }
}
