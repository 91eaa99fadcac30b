//! Driver configuration and builder

use embassy_time::Duration;

pub use crate::error::ConfigError;
use crate::ladder::{LadderBounds, LadderState};
use crate::packet::{DeviceAddress, DevicePayload};

/// Highest GPIO number accepted for the radio pins
pub const MAX_PIN: u8 = 48;

/// Lowest accepted mireds value
pub const MIN_MIREDS_LIMIT: u16 = 1;

/// Highest accepted mireds value
pub const MAX_MIREDS_LIMIT: u16 = 1000;

pub const DEFAULT_DEVICE_PAYLOAD: DevicePayload = [0x00, 0x76, 0x9A, 0x31];
pub const DEFAULT_BRIGHTNESS_STEPS: u8 = 75;
pub const DEFAULT_COLOR_TEMP_STEPS: u8 = 30;
pub const DEFAULT_MIN_MIREDS: u16 = 153;
pub const DEFAULT_MAX_MIREDS: u16 = 500;
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_TRANSITION_LENGTH: Duration = Duration::from_millis(0);
pub const DEFAULT_GAMMA_CORRECT: f32 = 1.0;

/// Wiring of the radio module
///
/// Only validated and reported, bus setup happens on the board side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioPins {
    pub ce: u8,
    pub cs: u8,
    pub clk: u8,
    pub mosi: u8,
    pub miso: u8,
}

impl Default for RadioPins {
    fn default() -> Self {
        Self {
            ce: 1,
            cs: 5,
            clk: 2,
            mosi: 4,
            miso: 3,
        }
    }
}

impl RadioPins {
    fn validate(&self) -> Result<(), ConfigError> {
        let pins = [
            ("ce", self.ce),
            ("cs", self.cs),
            ("clk", self.clk),
            ("mosi", self.mosi),
            ("miso", self.miso),
        ];
        for (name, pin) in pins {
            if pin > MAX_PIN {
                return Err(ConfigError::InvalidPin { name, pin });
            }
        }
        Ok(())
    }
}

/// Configuration for the remote light driver
#[derive(Debug, Clone)]
pub struct RemoteLightConfig {
    /// Radio module wiring
    pub pins: RadioPins,
    /// Radio address of the emulated remote
    pub device_address: DeviceAddress,
    /// Fixed payload prefix identifying the remote
    pub device_payload: DevicePayload,
    /// Rungs on the brightness ladder
    pub brightness_steps: u8,
    /// Rungs on the color temperature ladder
    pub color_temp_steps: u8,
    /// Coolest supported color temperature
    pub min_mireds: u16,
    /// Warmest supported color temperature
    pub max_mireds: u16,
    /// Minimum gap between two emitted commands
    pub step_delay: Duration,
    /// Transition length advertised to the host
    pub default_transition_length: Duration,
    /// Gamma exponent applied to brightness before quantization
    pub gamma_correct: f32,
    /// Estimate adopted at start
    pub initial_state: LadderState,
}

impl RemoteLightConfig {
    /// Create a configuration with default light parameters
    pub fn new(device_address: DeviceAddress) -> Self {
        Self {
            pins: RadioPins::default(),
            device_address,
            device_payload: DEFAULT_DEVICE_PAYLOAD,
            brightness_steps: DEFAULT_BRIGHTNESS_STEPS,
            color_temp_steps: DEFAULT_COLOR_TEMP_STEPS,
            min_mireds: DEFAULT_MIN_MIREDS,
            max_mireds: DEFAULT_MAX_MIREDS,
            step_delay: DEFAULT_STEP_DELAY,
            default_transition_length: DEFAULT_TRANSITION_LENGTH,
            gamma_correct: DEFAULT_GAMMA_CORRECT,
            initial_state: LadderState::default(),
        }
    }

    /// Start building a configuration
    pub fn builder(device_address: DeviceAddress) -> RemoteLightConfigBuilder {
        RemoteLightConfigBuilder::new(device_address)
    }

    /// Rung counts of both ladders
    pub const fn bounds(&self) -> LadderBounds {
        LadderBounds {
            brightness_steps: self.brightness_steps,
            color_temp_steps: self.color_temp_steps,
        }
    }

    /// Check every value against the accepted ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pins.validate()?;
        if self.brightness_steps == 0 {
            return Err(ConfigError::InvalidSteps {
                ladder: "brightness",
                steps: self.brightness_steps,
            });
        }
        if self.color_temp_steps == 0 {
            return Err(ConfigError::InvalidSteps {
                ladder: "color temperature",
                steps: self.color_temp_steps,
            });
        }
        let mireds_limits = MIN_MIREDS_LIMIT..=MAX_MIREDS_LIMIT;
        if !mireds_limits.contains(&self.min_mireds)
            || !mireds_limits.contains(&self.max_mireds)
            || self.min_mireds >= self.max_mireds
        {
            return Err(ConfigError::InvalidMiredsRange {
                min: self.min_mireds,
                max: self.max_mireds,
            });
        }
        if !self.gamma_correct.is_finite() || self.gamma_correct < 0.0 {
            return Err(ConfigError::InvalidGamma(self.gamma_correct));
        }
        if !self.bounds().contains(&self.initial_state) {
            return Err(ConfigError::InitialStateOutOfRange {
                brightness_index: self.initial_state.brightness_index,
                color_temp_index: self.initial_state.color_temp_index,
            });
        }
        Ok(())
    }

    /// Log the effective configuration
    pub fn log(&self) {
        let addr = self.device_address;
        let payload = self.device_payload;
        log::info!("Remote light configuration:");
        log::info!(
            "  Pins: CE={} CS={} CLK={} MOSI={} MISO={}",
            self.pins.ce,
            self.pins.cs,
            self.pins.clk,
            self.pins.mosi,
            self.pins.miso
        );
        log::info!(
            "  Device address: {:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            addr[0],
            addr[1],
            addr[2],
            addr[3],
            addr[4]
        );
        log::info!(
            "  Device payload: {:02X}:{:02X}:{:02X}:{:02X}",
            payload[0],
            payload[1],
            payload[2],
            payload[3]
        );
        log::info!("  Brightness steps: {}", self.brightness_steps);
        log::info!("  Color temp steps: {}", self.color_temp_steps);
        log::info!(
            "  Color temp range: {} - {} mireds",
            self.min_mireds,
            self.max_mireds
        );
        log::info!("  Step delay: {} ms", self.step_delay.as_millis());
        log::info!("  Gamma correct: {}", self.gamma_correct);
    }
}

/// Builder for [`RemoteLightConfig`]
///
/// ```
/// use quntis_light::RemoteLightConfig;
/// use quntis_light::Duration;
///
/// let config = RemoteLightConfig::builder([0x20, 0x21, 0x01, 0x31, 0xAA])
///     .brightness_steps(100)
///     .step_delay(Duration::from_millis(80))
///     .build();
/// assert!(config.is_ok());
/// ```
#[must_use]
pub struct RemoteLightConfigBuilder {
    config: RemoteLightConfig,
}

impl RemoteLightConfigBuilder {
    pub fn new(device_address: DeviceAddress) -> Self {
        Self {
            config: RemoteLightConfig::new(device_address),
        }
    }

    pub fn pins(mut self, pins: RadioPins) -> Self {
        self.config.pins = pins;
        self
    }

    pub fn device_payload(mut self, payload: DevicePayload) -> Self {
        self.config.device_payload = payload;
        self
    }

    pub fn brightness_steps(mut self, steps: u8) -> Self {
        self.config.brightness_steps = steps;
        self
    }

    pub fn color_temp_steps(mut self, steps: u8) -> Self {
        self.config.color_temp_steps = steps;
        self
    }

    /// Set the supported color temperature range
    pub fn mireds(mut self, min: u16, max: u16) -> Self {
        self.config.min_mireds = min;
        self.config.max_mireds = max;
        self
    }

    pub fn step_delay(mut self, delay: Duration) -> Self {
        self.config.step_delay = delay;
        self
    }

    pub fn default_transition_length(mut self, length: Duration) -> Self {
        self.config.default_transition_length = length;
        self
    }

    pub fn gamma_correct(mut self, gamma: f32) -> Self {
        self.config.gamma_correct = gamma;
        self
    }

    /// Set the last known lamp position
    pub fn initial_state(mut self, state: LadderState) -> Self {
        self.config.initial_state = state;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<RemoteLightConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
