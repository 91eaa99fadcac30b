//! Command sequencer - the step ladder state machine
//!
//! The lamp only understands relative button presses. The sequencer turns
//! absolute targets into the shortest run of presses from the tracked
//! estimate and releases them one at a time, at most one per `step_delay`.
//!
//! Queue order for a target is: power toggle, brightness steps, color
//! temperature steps. Every new target replaces whatever is still queued, and
//! the estimate already reflects every press released so far, so an
//! interrupted transition never overshoots.

use embassy_time::{Duration, Instant};

use crate::command::{CommandQueue, StepCommand};
use crate::config::RemoteLightConfig;
use crate::intent::TargetState;
use crate::ladder::{LadderBounds, LadderState};
use crate::resolver::TargetResolver;

/// Sequencer states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// Nothing queued
    Idle,
    /// Presses are waiting to be released
    Sequencing,
}

/// Turns targets into timed button presses
pub struct CommandSequencer {
    // Configuration
    bounds: LadderBounds,
    resolver: TargetResolver,
    step_delay: Duration,

    // Internal state
    state: LadderState,
    queue: CommandQueue,
    last_sent: Option<Instant>,
    calibrating: bool,
}

impl CommandSequencer {
    pub fn new(config: &RemoteLightConfig) -> Self {
        let bounds = config.bounds();
        Self {
            bounds,
            resolver: TargetResolver::new(config),
            step_delay: config.step_delay,
            state: bounds.clamp(config.initial_state),
            queue: CommandQueue::new(),
            last_sent: None,
            calibrating: false,
        }
    }

    /// Current estimate of the lamp position
    pub const fn state(&self) -> &LadderState {
        &self.state
    }

    pub const fn resolver(&self) -> &TargetResolver {
        &self.resolver
    }

    /// Commands still waiting to be released
    pub const fn pending(&self) -> &CommandQueue {
        &self.queue
    }

    /// Number of commands still waiting to be released
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn sequencer_state(&self) -> SequencerState {
        if self.queue.is_empty() {
            SequencerState::Idle
        } else {
            SequencerState::Sequencing
        }
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Check if a resync is still being released
    pub const fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    /// Replace the pending queue with the presses that reach `target`
    ///
    /// Returns the number of queued presses.
    pub fn submit(&mut self, target: &TargetState) -> usize {
        self.discard_pending();
        self.calibrating = false;

        let resolved = self.resolver.resolve(
            &self.state,
            target.power,
            target.brightness,
            target.color_temp_mireds,
        );

        if target.power != self.state.power_on {
            // Single press, so the estimate can follow right away
            self.enqueue(StepCommand::power(target.power), 1);
            self.state.power_on = target.power;
        }

        if target.power {
            let brightness_delta =
                i16::from(resolved.brightness_index) - i16::from(self.state.brightness_index);
            self.enqueue(
                StepCommand::brightness(brightness_delta),
                brightness_delta.unsigned_abs(),
            );

            let color_delta =
                i16::from(resolved.color_temp_index) - i16::from(self.state.color_temp_index);
            self.enqueue(StepCommand::color_temp(color_delta), color_delta.unsigned_abs());
        }

        let queued = self.queue.len();
        if queued > 0 {
            log::info!(
                "Starting transition: on={} brightness {} -> {}, color {} -> {} ({} presses)",
                target.power,
                self.state.brightness_index,
                resolved.brightness_index,
                self.state.color_temp_index,
                resolved.color_temp_index,
                queued
            );
        } else {
            log::debug!("Target already reached, nothing to send");
        }
        queued
    }

    /// Release the next press if it is due
    ///
    /// Returns at most one command per call, no matter how many periods have
    /// elapsed. The estimate is advanced as soon as the command is released.
    pub fn poll(&mut self, now: Instant) -> Option<StepCommand> {
        if !self.is_due(now) {
            return None;
        }
        let command = self.queue.pop()?;
        self.bounds.apply(&mut self.state, command);
        self.last_sent = Some(now);

        log::trace!(
            "Step {}: brightness={} color={} remaining={}",
            command.as_str(),
            self.state.brightness_index,
            self.state.color_temp_index,
            self.queue.len()
        );

        if self.queue.is_empty() {
            if self.calibrating {
                self.calibrating = false;
                log::info!(
                    "Calibration complete: brightness={}, color={}",
                    self.state.brightness_index,
                    self.state.color_temp_index
                );
            } else {
                log::info!(
                    "Transition done: on={} brightness={} color={}",
                    self.state.power_on,
                    self.state.brightness_index,
                    self.state.color_temp_index
                );
            }
        }
        Some(command)
    }

    /// Time left until the next press may be released
    ///
    /// Returns `None` when nothing is queued.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        if self.queue.is_empty() {
            return None;
        }
        let Some(last_sent) = self.last_sent else {
            return Some(Duration::from_ticks(0));
        };
        let deadline = last_sent + self.step_delay;
        Some(deadline.saturating_duration_since(now))
    }

    /// Push the lamp against its known extremes
    ///
    /// Assumes the lamp is on and as bright and warm as it gets, then queues
    /// a full sweep down and towards cold white. Once released, the estimate
    /// is exact again. Returns `false` if a resync is already running.
    pub fn resync(&mut self) -> bool {
        if self.calibrating {
            log::warn!("Calibration already in progress, ignoring");
            return false;
        }
        self.discard_pending();

        log::info!(
            "Calibrating: sending {} dim-down + {} color-cool steps to reach known minimum",
            self.bounds.brightness_steps,
            self.bounds.color_temp_steps
        );

        self.state = LadderState::new(
            true,
            self.bounds.brightness_top(),
            self.bounds.color_temp_top(),
        );
        self.enqueue(
            StepCommand::BrightnessDown,
            u16::from(self.bounds.brightness_steps),
        );
        self.enqueue(
            StepCommand::ColorCooler,
            u16::from(self.bounds.color_temp_steps),
        );
        self.calibrating = true;
        true
    }

    /// Adopt a host-restored state without sending anything
    pub fn restore(&mut self, target: &TargetState) -> LadderState {
        self.queue.clear();
        self.calibrating = false;
        self.state = self.resolver.resolve(
            &self.state,
            target.power,
            target.brightness,
            target.color_temp_mireds,
        );
        log::info!(
            "Initial state sync (no RF): on={} brightness_step={} color_step={}",
            self.state.power_on,
            self.state.brightness_index,
            self.state.color_temp_index
        );
        self.state
    }

    /// Correct the power estimate without sending anything
    ///
    /// A queued power toggle is dropped, the host has just told us where
    /// the lamp is. Pending steps are only kept if the lamp is on.
    pub fn override_power(&mut self, on: bool) {
        log::info!(
            "Power state override: {} -> {} (no RF sent)",
            self.state.power_on,
            on
        );
        if on {
            self.queue.retain(|command| !command.is_power());
        } else {
            self.queue.clear();
            self.calibrating = false;
        }
        self.state.power_on = on;
    }

    fn is_due(&self, now: Instant) -> bool {
        match self.last_sent {
            None => true,
            Some(last_sent) => now.saturating_duration_since(last_sent) >= self.step_delay,
        }
    }

    /// Drop the pending queue
    ///
    /// An unreleased power toggle never reached the lamp, so its optimistic
    /// flip is taken back.
    fn discard_pending(&mut self) {
        if let Some(power) = self.queue.iter().find(|command| command.is_power()) {
            self.state.power_on = power == StepCommand::PowerOff;
        }
        if !self.queue.is_empty() {
            log::debug!("Dropping {} pending presses", self.queue.len());
        }
        self.queue.clear();
    }

    fn enqueue(&mut self, command: StepCommand, count: u16) {
        if let Err(dropped) = self.queue.push_repeated(command, count) {
            log::warn!("Command queue full, dropping {}", dropped.as_str());
        }
    }
}
