//! Target resolution
//!
//! Maps continuous host values onto ladder rungs and back. The mapping is
//! total: anything outside the supported range is clamped.

use crate::config::RemoteLightConfig;
use crate::ladder::LadderState;

/// Quantizes brightness and color temperature to ladder rungs
#[derive(Debug, Clone, Copy)]
pub struct TargetResolver {
    brightness_steps: u8,
    color_temp_steps: u8,
    min_mireds: f32,
    max_mireds: f32,
    gamma: f32,
}

impl TargetResolver {
    pub fn new(config: &RemoteLightConfig) -> Self {
        let gamma = if config.gamma_correct.is_finite() && config.gamma_correct > 0.0 {
            config.gamma_correct
        } else {
            1.0
        };
        Self {
            brightness_steps: config.brightness_steps.max(1),
            color_temp_steps: config.color_temp_steps.max(1),
            min_mireds: f32::from(config.min_mireds.min(config.max_mireds)),
            max_mireds: f32::from(config.min_mireds.max(config.max_mireds)),
            gamma,
        }
    }

    /// Brightness rung for a brightness in `[0, 1]`
    ///
    /// Gamma is applied before quantization, so rung spacing follows the
    /// corrected curve.
    pub fn brightness_index(&self, brightness: f32) -> u8 {
        let level = libm::powf(clamp_unit(brightness), self.gamma);
        quantize(level, self.brightness_steps)
    }

    /// Color temperature rung for a value in mireds
    pub fn color_temp_index(&self, mireds: f32) -> u8 {
        let mireds = if mireds.is_nan() {
            self.min_mireds
        } else {
            mireds.clamp(self.min_mireds, self.max_mireds)
        };
        let span = self.max_mireds - self.min_mireds;
        if span <= 0.0 {
            return 0;
        }
        quantize((mireds - self.min_mireds) / span, self.color_temp_steps)
    }

    /// Brightness reported for a rung
    ///
    /// Rung 0 is the dimmest lit level, so it never reports as zero.
    pub fn brightness_of(&self, index: u8) -> f32 {
        let floor = 1.0 / f32::from(self.brightness_steps);
        let level = dequantize(index, self.brightness_steps);
        libm::powf(level, 1.0 / self.gamma).max(floor)
    }

    /// Color temperature in mireds reported for a rung
    pub fn mireds_of(&self, index: u8) -> f32 {
        let position = dequantize(index, self.color_temp_steps);
        self.min_mireds + position * (self.max_mireds - self.min_mireds)
    }

    /// Resolve a full target against the current estimate
    ///
    /// Missing values keep the current rung.
    pub fn resolve(
        &self,
        current: &LadderState,
        power: bool,
        brightness: Option<f32>,
        color_temp_mireds: Option<f32>,
    ) -> LadderState {
        LadderState {
            power_on: power,
            brightness_index: brightness
                .map_or(current.brightness_index, |value| self.brightness_index(value)),
            color_temp_index: color_temp_mireds
                .map_or(current.color_temp_index, |value| self.color_temp_index(value)),
        }
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Round a position in `[0, 1]` to one of `steps` rungs, halves away from zero
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(position: f32, steps: u8) -> u8 {
    let top = f32::from(steps.saturating_sub(1));
    let index = libm::roundf(position.clamp(0.0, 1.0) * top);
    index.clamp(0.0, top) as u8
}

fn dequantize(index: u8, steps: u8) -> f32 {
    let top = steps.saturating_sub(1);
    if top == 0 {
        return 0.0;
    }
    f32::from(index.min(top)) / f32::from(top)
}
