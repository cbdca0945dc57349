//! Actuator motion engine.
//!
//! - [`servo`]: angle-to-duty pulse mapping and the PWM-backed servo
//!   wrapper, generic over `embedded_hal::pwm::SetDutyCycle`.
//! - [`dispatch`]: the command dispatcher that turns a channel count
//!   vector into sequential dispense cycles.
pub mod dispatch;
pub mod servo;
