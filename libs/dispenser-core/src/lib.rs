//! Core library for the pill-dispenser firmware.
//!
//! Everything that can run without hardware lives here: the serial
//! [`protocol`] (byte accumulator, frame/line decoding, acknowledgments)
//! and the [`motion`] engine (pulse mapping and the dispense sequencer).
//! The firmware crate binds these to UART0 and the LEDC PWM peripheral;
//! hardware is only reached through `embedded-hal` traits, so the whole
//! crate is testable on the host.
#![no_std]

#[cfg(test)]
extern crate std;

use core::fmt::Display;

pub mod motion;
pub mod protocol;

/// Number of independently addressable dispenser channels.
pub const CHANNEL_COUNT: usize = 4;

/// Actuation cycles requested per channel by one command.
///
/// The binary protocol carries each count as a raw byte (0-255); the
/// legacy text protocol clamps into 0..=20 before building the vector.
pub type ChannelCounts = [u8; CHANNEL_COUNT];

/// Identity of one medication bin, fixed at startup for the process
/// lifetime. Index 0-3 matches the wire order of [`ChannelCounts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bin {
    Pill1 = 0,
    Pill2 = 1,
    Pill3 = 2,
    Pill4 = 3,
}

impl Display for Bin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Bin::Pill1 => f.write_str("pill1"),
            Bin::Pill2 => f.write_str("pill2"),
            Bin::Pill3 => f.write_str("pill3"),
            Bin::Pill4 => f.write_str("pill4"),
        }
    }
}

impl From<usize> for Bin {
    fn from(value: usize) -> Self {
        match value {
            0 => Bin::Pill1,
            1 => Bin::Pill2,
            2 => Bin::Pill3,
            3 => Bin::Pill4,
            _ => unreachable!(),
        }
    }
}
