//! Error types
//!
//! - [`ConfigError`] - rejected configuration values
//! - [`EncodeError`] - XN297 frames that cannot be put on air
//! - [`Xn297Error`] - failures of the XN297 transport
//!
//! Nothing in the sequencing path returns an error: out-of-range targets are
//! clamped and transport failures are only reported.

use crate::config::MAX_PIN;

/// Errors that can occur when validating configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A ladder must have between 1 and 255 rungs
    InvalidSteps {
        /// Which ladder was rejected
        ladder: &'static str,
        /// Rungs requested
        steps: u8,
    },
    /// Mireds must lie in `1..=1000` with `min < max`
    InvalidMiredsRange {
        /// Requested lower bound
        min: u16,
        /// Requested upper bound
        max: u16,
    },
    /// Radio pins must lie in `0..=MAX_PIN`
    InvalidPin {
        /// Pin role
        name: &'static str,
        /// Requested GPIO number
        pin: u8,
    },
    /// Gamma exponent must be finite and non-negative
    InvalidGamma(f32),
    /// The initial estimate does not fit on the configured ladders
    InitialStateOutOfRange {
        /// Requested brightness rung
        brightness_index: u8,
        /// Requested color temperature rung
        color_temp_index: u8,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidSteps { ladder, steps } => {
                write!(f, "Invalid {ladder} steps: {steps} (expected 1..=255)")
            }
            Self::InvalidMiredsRange { min, max } => {
                write!(
                    f,
                    "Invalid mireds range: {min}..{max} (expected 1 <= min < max <= 1000)"
                )
            }
            Self::InvalidPin { name, pin } => {
                write!(f, "Invalid {name} pin: {pin} (max {MAX_PIN})")
            }
            Self::InvalidGamma(gamma) => write!(f, "Invalid gamma correction: {gamma}"),
            Self::InitialStateOutOfRange {
                brightness_index,
                color_temp_index,
            } => write!(
                f,
                "Initial state out of range: brightness={brightness_index}, color_temp={color_temp_index}"
            ),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Errors that can occur when encoding an XN297 frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// XN297 addresses are 3 to 5 bytes long
    AddressLength(usize),
    /// Payload does not fit into a single air frame
    PayloadTooLong {
        /// Maximum payload length for the address in use
        max: usize,
        /// Provided payload length
        provided: usize,
    },
}

impl core::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AddressLength(len) => {
                write!(f, "Invalid address length: {len} (expected 3..=5)")
            }
            Self::PayloadTooLong { max, provided } => {
                write!(f, "Payload too long: max {max} bytes, provided {provided}")
            }
        }
    }
}

impl core::error::Error for EncodeError {}

/// Errors that can occur when sending through the XN297 transport
///
/// Generic over the radio error to preserve the underlying hardware error.
#[derive(Debug)]
pub enum Xn297Error<E> {
    /// The frame could not be encoded
    Encode(EncodeError),
    /// Every repeat of the frame failed to write
    Radio(E),
}

impl<E> From<EncodeError> for Xn297Error<E> {
    fn from(error: EncodeError) -> Self {
        Self::Encode(error)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Xn297Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Encode(error) => write!(f, "Encode error: {error}"),
            Self::Radio(error) => write!(f, "Radio error: {error:?}"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Xn297Error<E> {}
