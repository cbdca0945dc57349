//! Asynchronous tasks for the dispenser runtime.
//!
//! There is exactly one: [`protocol_task`], the long-lived loop that
//! owns the serial link and the four bin servos. Command execution
//! blocks inside that loop; no other task touches the actuators.
pub mod protocol_task;
