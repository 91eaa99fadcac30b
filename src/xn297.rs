//! XN297 air protocol
//!
//! The lamp's remote uses an XN297 transceiver. An nRF24L01 can talk to it
//! when its own CRC and auto-ack are disabled and every payload is written
//! pre-encoded: address bytes reversed and whitened, payload bytes
//! bit-reversed and whitened, followed by the XN297 CRC-16.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use heapless::Vec;

use crate::RadioTransport;
use crate::error::{EncodeError, Xn297Error};
use crate::packet::{DeviceAddress, FRAME_LENGTH, Frame, PAYLOAD_LENGTH};

/// Largest raw payload the radio accepts
pub const MAX_AIR_FRAME: usize = 32;

/// Length of the payload the remote puts on air
///
/// `[payload0..3, press_counter, opcode]`
pub const AIR_PAYLOAD_LENGTH: usize = FRAME_LENGTH + 1;

/// Writes of every command, like the physical remote
pub const DEFAULT_REPEATS: u8 = 6;

/// Gap between two writes of the same command
pub const DEFAULT_REPEAT_GAP: Duration = Duration::from_millis(5);

/// Preamble byte sent ahead of addresses shorter than 4 bytes
const SHORT_ADDRESS_PREAMBLE: u8 = 0x55;

const CRC_POLYNOMIAL: u16 = 0x1021;
const CRC_INITIAL: u16 = 0xB5D2;

const SCRAMBLE: [u8; 35] = [
    0xE3, 0xB1, 0x4B, 0xEA, 0x85, 0xBC, 0xE5, 0x66, 0x0D, 0xAE, 0x8C, 0x88, 0x12, 0x69, 0xEE, 0x1F,
    0xC7, 0x62, 0x97, 0xD5, 0x0B, 0x79, 0xCA, 0xCC, 0x1B, 0x5D, 0x19, 0x10, 0x24, 0xD3, 0xDC, 0x3F,
    0x8E, 0xC5, 0x2F,
];

/// CRC output mask, indexed by `address_len - 3 + payload_len`
const CRC_XOROUT: [u16; 28] = [
    0x0000, 0x3448, 0x9BA7, 0x8BBB, 0x85E1, 0x3E8C, 0x451E, 0x18E6, 0x6B24, 0xE7AB, 0x3828,
    0x814B, 0xD461, 0xF494, 0x2503, 0x691D, 0xFE8B, 0x9BA7, 0x8B17, 0x2920, 0x8B5F, 0x61B1,
    0xD391, 0x7401, 0x2138, 0x129F, 0xB3A0, 0x2988,
];

/// Raw radio that puts pre-encoded payloads on air
///
/// Implement this for an nRF24L01 configured for XN297 emulation
/// (1 Mbps, no auto-ack, no CRC, fixed payload size).
pub trait RawRadio {
    type Error: core::fmt::Debug;

    /// Write one encoded payload
    fn write(&mut self, payload: &[u8]) -> Result<(), Self::Error>;
}

/// Longest payload that fits an air frame for the given address length
pub fn max_payload_len(address_len: usize) -> usize {
    let preamble = usize::from(address_len < 4);
    let by_frame = MAX_AIR_FRAME.saturating_sub(2 + preamble + address_len);
    let by_crc_table = (CRC_XOROUT.len() + 2).saturating_sub(address_len);
    by_frame.min(by_crc_table)
}

/// Encode an address and payload into an XN297 air frame
pub fn encode(address: &[u8], payload: &[u8]) -> Result<Vec<u8, MAX_AIR_FRAME>, EncodeError> {
    let address_len = address.len();
    if !(3..=5).contains(&address_len) {
        return Err(EncodeError::AddressLength(address_len));
    }
    let max = max_payload_len(address_len);
    if payload.len() > max {
        return Err(EncodeError::PayloadTooLong {
            max,
            provided: payload.len(),
        });
    }

    let mut buf: Vec<u8, MAX_AIR_FRAME> = Vec::new();
    let crc_start = if address_len < 4 {
        push(&mut buf, SHORT_ADDRESS_PREAMBLE);
        1
    } else {
        0
    };

    for (i, byte) in address.iter().rev().enumerate() {
        push(&mut buf, byte ^ SCRAMBLE[i]);
    }
    for (i, byte) in payload.iter().enumerate() {
        push(&mut buf, byte.reverse_bits() ^ SCRAMBLE[address_len + i]);
    }

    let crc = buf[crc_start..]
        .iter()
        .fold(CRC_INITIAL, |crc, byte| crc16_update(crc, *byte))
        ^ CRC_XOROUT[address_len - 3 + payload.len()];
    for byte in crc.to_be_bytes() {
        push(&mut buf, byte);
    }

    Ok(buf)
}

/// Capacity is checked up front by `max_payload_len`
fn push(buf: &mut Vec<u8, MAX_AIR_FRAME>, byte: u8) {
    let pushed = buf.push(byte);
    debug_assert!(pushed.is_ok(), "air frame overflow");
}

fn crc16_update(crc: u16, byte: u8) -> u16 {
    let mut crc = crc ^ (u16::from(byte) << 8);
    for _ in 0..8 {
        crc = if crc & 0x8000 != 0 {
            (crc << 1) ^ CRC_POLYNOMIAL
        } else {
            crc << 1
        };
    }
    crc
}

/// [`RadioTransport`] that emulates the remote over an XN297-compatible radio
pub struct Xn297Transport<R: RawRadio, D: DelayNs> {
    radio: R,
    delay: D,
    repeats: u8,
    repeat_gap: Duration,
    press_counter: u8,
    packet_count: u32,
}

impl<R: RawRadio, D: DelayNs> Xn297Transport<R, D> {
    /// Create a transport with the remote's burst timing
    pub fn new(radio: R, delay: D) -> Self {
        Self {
            radio,
            delay,
            repeats: DEFAULT_REPEATS,
            repeat_gap: DEFAULT_REPEAT_GAP,
            press_counter: 0,
            packet_count: 0,
        }
    }

    /// Set how often each command is written (at least once)
    #[must_use]
    pub fn with_repeats(mut self, repeats: u8, gap: Duration) -> Self {
        self.repeats = repeats.max(1);
        self.repeat_gap = gap;
        self
    }

    /// Payloads written to the radio so far, repeats included
    pub const fn packet_count(&self) -> u32 {
        self.packet_count
    }

    pub fn reset_packet_count(&mut self) {
        self.packet_count = 0;
    }

    /// Counter value the next command will carry
    pub const fn press_counter(&self) -> u8 {
        self.press_counter
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Release the radio and delay
    pub fn release(self) -> (R, D) {
        (self.radio, self.delay)
    }

    /// Expand a frame into the payload the remote puts on air
    fn air_payload(&mut self, frame: &Frame) -> [u8; AIR_PAYLOAD_LENGTH] {
        let mut payload = [0; AIR_PAYLOAD_LENGTH];
        payload[..PAYLOAD_LENGTH].copy_from_slice(&frame[..PAYLOAD_LENGTH]);
        payload[PAYLOAD_LENGTH] = self.press_counter;
        payload[PAYLOAD_LENGTH + 1] = frame[PAYLOAD_LENGTH];
        self.press_counter = self.press_counter.wrapping_add(1);
        payload
    }
}

impl<R: RawRadio, D: DelayNs> RadioTransport for Xn297Transport<R, D> {
    type Error = Xn297Error<R::Error>;

    /// Write the command `repeats` times
    ///
    /// Succeeds if at least one write went through.
    fn send(&mut self, address: &DeviceAddress, frame: &Frame) -> Result<(), Self::Error> {
        let payload = self.air_payload(frame);
        let encoded = encode(address, &payload)?;

        log::debug!(
            "SendCommand cmd=0x{:02X} idx={} repeats={}",
            payload[PAYLOAD_LENGTH + 1],
            payload[PAYLOAD_LENGTH],
            self.repeats
        );

        let gap_us = u32::try_from(self.repeat_gap.as_micros()).unwrap_or(u32::MAX);
        let mut delivered = false;
        let mut last_error = None;
        for i in 0..self.repeats {
            match self.radio.write(&encoded) {
                Ok(()) => delivered = true,
                Err(error) => last_error = Some(error),
            }
            self.packet_count = self.packet_count.wrapping_add(1);
            if i + 1 < self.repeats {
                self.delay.delay_us(gap_us);
            }
        }

        match last_error {
            Some(error) if !delivered => Err(Xn297Error::Radio(error)),
            _ => Ok(()),
        }
    }
}
