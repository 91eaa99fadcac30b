#![allow(dead_code)]

use embedded_hal::delay::DelayNs;
use quntis_light::{DeviceAddress, Frame, RadioTransport, RawRadio};

pub const ADDRESS: DeviceAddress = [0x20, 0x21, 0x01, 0x31, 0xAA];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakeRadioError;

/// Transport that records every frame it is asked to send
#[derive(Default)]
pub struct FakeTransport {
    pub sent: Vec<(DeviceAddress, Frame)>,
    pub fail: bool,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Vec::new(),
            fail: true,
        }
    }

    pub fn opcodes(&self) -> Vec<u8> {
        self.sent.iter().map(|(_, frame)| frame[4]).collect()
    }
}

impl RadioTransport for FakeTransport {
    type Error = FakeRadioError;

    fn send(&mut self, address: &DeviceAddress, frame: &Frame) -> Result<(), Self::Error> {
        self.sent.push((*address, *frame));
        if self.fail { Err(FakeRadioError) } else { Ok(()) }
    }
}

/// Radio that records raw writes, failing the ones listed in `fail_writes`
#[derive(Default)]
pub struct FakeRadio {
    pub writes: Vec<Vec<u8>>,
    pub fail_writes: Vec<usize>,
}

impl RawRadio for FakeRadio {
    type Error = FakeRadioError;

    fn write(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        let index = self.writes.len();
        self.writes.push(payload.to_vec());
        if self.fail_writes.contains(&index) {
            Err(FakeRadioError)
        } else {
            Ok(())
        }
    }
}

/// Delay that only accumulates the requested time
#[derive(Default)]
pub struct FakeDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }
}
