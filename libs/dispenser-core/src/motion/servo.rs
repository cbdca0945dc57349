//! Hobby-servo drive over a PWM channel.
use fugit::Hertz;
use log::{debug, error};

use embedded_hal::pwm::SetDutyCycle;

use crate::Bin;

/// Lowest supported angle pulse width (0°).
pub const MIN_PULSE_US: u32 = 1000;
/// Highest supported angle pulse width (180°).
pub const MAX_PULSE_US: u32 = 2000;
/// Largest commandable angle in degrees.
pub const MAX_ANGLE: i32 = 180;

/// Maps a target angle to a PWM duty register value.
///
/// Out-of-range angles saturate rather than fail. `max_duty` is the
/// driver's full-scale duty (`SetDutyCycle::max_duty_cycle`), `period_us`
/// the PWM period; multiplications run before divisions so integer
/// truncation stays below one duty step.
pub fn angle_to_duty(angle: i32, max_duty: u32, period_us: u32) -> u16 {
    let angle = angle.clamp(0, MAX_ANGLE) as u32;
    let pulse_us = MIN_PULSE_US + angle * (MAX_PULSE_US - MIN_PULSE_US) / MAX_ANGLE as u32;
    ((pulse_us * max_duty) / period_us).min(max_duty) as u16
}

/// One dispenser actuator bound to a fixed PWM output.
#[derive(Debug)]
pub struct Servo<PWM> {
    pwm: PWM,
    angle: u8,
    max_duty: u32,
    frequency: Hertz<u32>,
    bin: Bin,
}

impl<PWM> Servo<PWM>
where
    PWM: SetDutyCycle,
{
    pub fn new(pwm: PWM, max_duty: u32, frequency: Hertz<u32>, bin: Bin) -> Self {
        Self {
            pwm,
            angle: 0,
            max_duty,
            frequency,
            bin,
        }
    }

    pub fn bin(&self) -> Bin {
        self.bin
    }

    /// Sets the servo angle in degrees.
    ///
    /// Values outside 0..=180 are clamped. A PWM driver failure is
    /// logged, not propagated; one missed step must not abort a dispense
    /// in progress.
    pub fn set_angle(&mut self, angle: u8) {
        let angle = angle.clamp(0, MAX_ANGLE as u8);

        //Avoid setting the same angle again
        if self.angle == angle {
            return;
        }
        self.angle = angle;

        let period_us = 1_000_000 / self.frequency.raw();
        let duty = angle_to_duty(angle as i32, self.max_duty, period_us);
        debug!("{} duty: {duty}", self.bin);
        if let Err(e) = self.pwm.set_duty_cycle(duty) {
            error!("{} error writing angle {angle}: {e:?}", self.bin);
        }
    }
}
