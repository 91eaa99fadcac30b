//! Remote frame builder
//!
//! Every button of the remote is a single opcode byte appended to the fixed
//! payload that identifies the remote.

use crate::command::StepCommand;

/// Length of the radio address of the remote
pub const ADDRESS_LENGTH: usize = 5;

/// Length of the fixed payload that identifies the remote
pub const PAYLOAD_LENGTH: usize = 4;

/// Length of a built frame
pub const FRAME_LENGTH: usize = PAYLOAD_LENGTH + 1;

/// Radio address of the emulated remote
pub type DeviceAddress = [u8; ADDRESS_LENGTH];

/// Fixed payload prefix of the emulated remote
pub type DevicePayload = [u8; PAYLOAD_LENGTH];

/// Frame layout: `[payload0, payload1, payload2, payload3, opcode]`
pub type Frame = [u8; FRAME_LENGTH];

const OPCODE_POWER: u8 = 0x20;
const OPCODE_COLOR: u8 = 0x30;
const OPCODE_DIM: u8 = 0x40;

/// Or-ed into a button family to select its "down" direction
const OPCODE_DOWN: u8 = 0x08;

const OPCODE_COLOR_DOWN: u8 = OPCODE_COLOR | OPCODE_DOWN;
const OPCODE_DIM_DOWN: u8 = OPCODE_DIM | OPCODE_DOWN;

/// Button opcodes understood by the lamp receiver.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Power toggle
    Power = OPCODE_POWER,
    /// Color temperature towards cold white
    ColorCooler = OPCODE_COLOR,
    /// Color temperature towards warm white
    ColorWarmer = OPCODE_COLOR_DOWN,
    /// One brightness step up
    BrightnessUp = OPCODE_DIM,
    /// One brightness step down
    BrightnessDown = OPCODE_DIM_DOWN,
}

impl Opcode {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            OPCODE_POWER => Self::Power,
            OPCODE_COLOR => Self::ColorCooler,
            OPCODE_COLOR_DOWN => Self::ColorWarmer,
            OPCODE_DIM => Self::BrightnessUp,
            OPCODE_DIM_DOWN => Self::BrightnessDown,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }
}

impl From<StepCommand> for Opcode {
    /// The remote only has a power toggle, so both power tokens share it.
    fn from(command: StepCommand) -> Self {
        match command {
            StepCommand::PowerOn | StepCommand::PowerOff => Self::Power,
            StepCommand::BrightnessUp => Self::BrightnessUp,
            StepCommand::BrightnessDown => Self::BrightnessDown,
            StepCommand::ColorWarmer => Self::ColorWarmer,
            StepCommand::ColorCooler => Self::ColorCooler,
        }
    }
}

/// Build the frame for a single button press.
///
/// The address is not part of the frame, the transport addresses the
/// packet, but it is accepted here so that a frame is always built against
/// a complete remote identity.
pub const fn build(_address: &DeviceAddress, payload: &DevicePayload, opcode: Opcode) -> Frame {
    [
        payload[0],
        payload[1],
        payload[2],
        payload[3],
        opcode.as_raw(),
    ]
}
