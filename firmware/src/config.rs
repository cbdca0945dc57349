//! Deployment constants for the dispenser firmware.
//!
//! Servo outputs sit on GPIO 18, 19, 21 and 22 (bins 1-4); the command
//! link is UART0, shared with the board's USB-UART bridge.
use dispenser_core::protocol::line::ChannelNames;

pub const UART_BAUD: u32 = 115200;

/// Largest chunk pulled from the UART per loop pass.
pub const READ_CHUNK_SIZE: usize = 256;
/// Bounded poll timeout on the UART read, milliseconds.
pub const POLL_TIMEOUT_MS: u64 = 100;
/// Idle pause between loop passes, milliseconds.
pub const IDLE_DELAY_MS: u64 = 10;

/// Capacity of the inbound byte accumulator.
pub const RX_ACCUMULATOR_CAPACITY: usize = 2048;

pub const SERVO_FREQ_HZ: u32 = 50;

/// Key table for the legacy text protocol, selected per deployment.
#[cfg(feature = "medication-labels")]
pub const CHANNEL_NAMES: ChannelNames = ChannelNames::MEDICATION_LABELS;
#[cfg(not(feature = "medication-labels"))]
pub const CHANNEL_NAMES: ChannelNames = ChannelNames::LEGACY;
