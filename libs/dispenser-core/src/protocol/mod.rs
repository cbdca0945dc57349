//! Serial command protocol.
//!
//! The controller talks to the dispenser over a single UART carrying two
//! inbound formats: the fixed 8-byte `SAURON_UART_V1` frame and a legacy
//! newline-delimited JSON object. Raw bytes land in the
//! [`accumulator`], the [`demux`] splits them into complete messages and
//! resynchronizes on corruption, [`frame`] and [`line`] decode one
//! message each, and [`ack`] renders the JSON reply line.
pub mod accumulator;
pub mod ack;
pub mod demux;
pub mod frame;
pub mod line;
