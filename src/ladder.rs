//! Tracked position of the lamp
//!
//! The radio link is one-way, so this is what the driver believes it has
//! sent, not what the lamp actually received.

use crate::command::StepCommand;

/// Estimated lamp position on both ladders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LadderState {
    pub power_on: bool,
    /// Rung on the brightness ladder, 0 is the dimmest lit level
    pub brightness_index: u8,
    /// Rung on the color temperature ladder, 0 is the coolest (`min_mireds`)
    pub color_temp_index: u8,
}

impl LadderState {
    pub const fn new(power_on: bool, brightness_index: u8, color_temp_index: u8) -> Self {
        Self {
            power_on,
            brightness_index,
            color_temp_index,
        }
    }
}

/// Number of rungs on each ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LadderBounds {
    pub brightness_steps: u8,
    pub color_temp_steps: u8,
}

impl LadderBounds {
    /// Highest reachable brightness rung
    pub const fn brightness_top(self) -> u8 {
        self.brightness_steps.saturating_sub(1)
    }

    /// Highest reachable color temperature rung
    pub const fn color_temp_top(self) -> u8 {
        self.color_temp_steps.saturating_sub(1)
    }

    /// Check that both indices lie on their ladders
    pub const fn contains(self, state: &LadderState) -> bool {
        state.brightness_index <= self.brightness_top()
            && state.color_temp_index <= self.color_temp_top()
    }

    /// Pull both indices back onto their ladders
    pub fn clamp(self, state: LadderState) -> LadderState {
        LadderState {
            power_on: state.power_on,
            brightness_index: state.brightness_index.min(self.brightness_top()),
            color_temp_index: state.color_temp_index.min(self.color_temp_top()),
        }
    }

    /// Advance the estimate by one emitted command
    ///
    /// Steps past either end of a ladder are absorbed, like the lamp does.
    pub fn apply(self, state: &mut LadderState, command: StepCommand) {
        match command {
            StepCommand::PowerOn => state.power_on = true,
            StepCommand::PowerOff => state.power_on = false,
            StepCommand::BrightnessUp => {
                state.brightness_index = step_up(state.brightness_index, self.brightness_top());
            }
            StepCommand::BrightnessDown => {
                state.brightness_index = state.brightness_index.saturating_sub(1);
            }
            StepCommand::ColorWarmer => {
                state.color_temp_index = step_up(state.color_temp_index, self.color_temp_top());
            }
            StepCommand::ColorCooler => {
                state.color_temp_index = state.color_temp_index.saturating_sub(1);
            }
        }
    }
}

const fn step_up(index: u8, top: u8) -> u8 {
    if index >= top { top } else { index + 1 }
}
