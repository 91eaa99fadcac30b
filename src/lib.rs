#![no_std]

//! Step-sequencing driver for lamps that only understand a remote control.
//!
//! The lamp exposes no absolute "set brightness" command, only the buttons of
//! its remote. The driver tracks where it believes the lamp is on a brightness
//! ladder and a color temperature ladder, and emits the button presses that
//! walk it to each new target.
//!
//! - `packet` - frame builder and button opcodes
//! - `resolver` - continuous values to ladder rungs
//! - `sequencer` - the step ladder state machine
//! - `intent` - interrupt-safe channel for host requests
//! - `light` - host-facing driver tying it all to a [`RadioTransport`]
//! - `xn297` - XN297 air encoding and transport

pub mod command;
pub mod config;
pub mod error;
pub mod intent;
pub mod ladder;
pub mod light;
pub mod packet;
pub mod resolver;
pub mod sequencer;
pub mod xn297;

pub use command::{CommandQueue, StepCommand};
pub use config::{RadioPins, RemoteLightConfig, RemoteLightConfigBuilder};
pub use error::{ConfigError, EncodeError, Xn297Error};
pub use intent::{IntentChannel, IntentReceiver, IntentSender, LightIntent, TargetState};
pub use ladder::{LadderBounds, LadderState};
pub use light::{LightSnapshot, RemoteLight, TickResult};
pub use packet::{DeviceAddress, DevicePayload, Frame, Opcode};
pub use resolver::TargetResolver;
pub use sequencer::{CommandSequencer, SequencerState};
pub use xn297::{RawRadio, Xn297Transport};

pub use embassy_time::{Duration, Instant};

/// Abstract radio transport trait
///
/// Implement this trait to support different radios. Sending is
/// fire-and-forget: a successful send only means the frame left the radio.
pub trait RadioTransport {
    type Error: core::fmt::Debug;

    /// Send a frame to the given address
    fn send(&mut self, address: &DeviceAddress, frame: &Frame) -> Result<(), Self::Error>;
}

/// Install `esp-println` as the `log` backend
#[cfg(feature = "esp32-log")]
pub fn init_logger(level: log::LevelFilter) {
    esp_println::logger::init_logger(level);
}
