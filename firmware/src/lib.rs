//! Library root for the pill-dispenser firmware.
//!
//! Re-exports the [`config`] constants and the [`tasks`] module holding
//! the single protocol-processing task. Protocol and motion logic live
//! in the `dispenser-core` crate; this crate only binds them to the
//! ESP32's UART0 and LEDC peripherals.
#![no_std]

pub mod config;
pub mod tasks;
