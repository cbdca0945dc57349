//! Command dispatcher: channel counts in, servo motion out.
//!
//! Execution is deliberately sequential and blocking with respect to the
//! calling task: one command always runs to completion, in channel
//! order, before the protocol loop reads any further serial input.
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::delay::DelayNs;
use log::info;

use crate::motion::servo::Servo;
use crate::{ChannelCounts, CHANNEL_COUNT};

/// Timing and geometry of one dispense cycle.
#[derive(Debug, Clone, Copy)]
pub struct MotionProfile {
    /// Angular steps per sweep direction.
    pub sweep_steps: u32,
    /// Duration of one full up-and-down sweep, milliseconds.
    pub move_duration_ms: u32,
    /// Shake alternations after the sweep, to free pills stuck on the
    /// chute.
    pub shake_count: u32,
    /// Dwell at each shake endpoint, milliseconds.
    pub shake_interval_ms: u32,
    /// Shake deflection angle, degrees.
    pub shake_angle: u8,
    /// Pause after each cycle before the next repetition or channel,
    /// milliseconds.
    pub settle_ms: u32,
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self {
            sweep_steps: 20,
            move_duration_ms: 1000,
            shake_count: 3,
            shake_interval_ms: 50,
            shake_angle: 20,
            settle_ms: 200,
        }
    }
}

impl MotionProfile {
    fn step_delay_ms(&self) -> u32 {
        self.move_duration_ms / (2 * self.sweep_steps)
    }
}

/// Runs the requested number of dispense cycles on each channel, in
/// ascending channel order.
pub async fn execute<PWM, D>(
    servos: &mut [Servo<PWM>; CHANNEL_COUNT],
    counts: &ChannelCounts,
    delay: &mut D,
    profile: &MotionProfile,
) where
    PWM: SetDutyCycle,
    D: DelayNs,
{
    for (index, servo) in servos.iter_mut().enumerate() {
        let requested = counts[index];
        if requested == 0 {
            continue;
        }
        info!("dispensing {requested} cycle(s) from {}", servo.bin());
        for _ in 0..requested {
            dispense_cycle(servo, delay, profile).await;
            delay.delay_ms(profile.settle_ms).await;
        }
    }
}

/// One full actuation cycle: sweep 0°→180°→0°, shake, return to rest.
async fn dispense_cycle<PWM, D>(servo: &mut Servo<PWM>, delay: &mut D, profile: &MotionProfile)
where
    PWM: SetDutyCycle,
    D: DelayNs,
{
    let steps = profile.sweep_steps;
    let step_delay = profile.step_delay_ms();

    for i in 0..=steps {
        servo.set_angle((i * 180 / steps) as u8);
        delay.delay_ms(step_delay).await;
    }
    for i in 0..=steps {
        servo.set_angle((180 - i * 180 / steps) as u8);
        delay.delay_ms(step_delay).await;
    }

    for _ in 0..profile.shake_count {
        servo.set_angle(0);
        delay.delay_ms(profile.shake_interval_ms).await;
        servo.set_angle(profile.shake_angle);
        delay.delay_ms(profile.shake_interval_ms).await;
    }
    servo.set_angle(0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::servo::angle_to_duty;
    use crate::Bin;
    use core::cell::RefCell;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use fugit::HertzU32;
    use std::vec::Vec;

    const FULL_SCALE: u32 = 0xFFFF;
    const PERIOD_US: u32 = 20_000;

    struct RecordingPwm<'a> {
        log: &'a RefCell<Vec<u16>>,
    }

    impl embedded_hal::pwm::ErrorType for RecordingPwm<'_> {
        type Error = Infallible;
    }

    impl SetDutyCycle for RecordingPwm<'_> {
        fn max_duty_cycle(&self) -> u16 {
            FULL_SCALE as u16
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
            self.log.borrow_mut().push(duty);
            Ok(())
        }
    }

    struct InstantDelay {
        total_ms: u32,
    }

    impl DelayNs for InstantDelay {
        async fn delay_ns(&mut self, ns: u32) {
            self.total_ms += ns / 1_000_000;
        }
    }

    fn peaks(log: &RefCell<Vec<u16>>) -> usize {
        let peak = angle_to_duty(180, FULL_SCALE, PERIOD_US);
        log.borrow().iter().filter(|&&d| d == peak).count()
    }

    #[test]
    fn executes_requested_cycles_per_channel_in_order() {
        let logs: [RefCell<Vec<u16>>; 4] = Default::default();
        let mut servos = [
            Servo::new(RecordingPwm { log: &logs[0] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill1),
            Servo::new(RecordingPwm { log: &logs[1] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill2),
            Servo::new(RecordingPwm { log: &logs[2] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill3),
            Servo::new(RecordingPwm { log: &logs[3] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill4),
        ];
        let mut delay = InstantDelay { total_ms: 0 };

        block_on(execute(
            &mut servos,
            &[2, 0, 1, 0],
            &mut delay,
            &MotionProfile::default(),
        ));

        // The 180° peak is reached exactly once per cycle.
        assert_eq!(peaks(&logs[0]), 2);
        assert_eq!(peaks(&logs[2]), 1);
        // Untouched channels see no PWM traffic at all.
        assert!(logs[1].borrow().is_empty());
        assert!(logs[3].borrow().is_empty());
    }

    #[test]
    fn zero_counts_do_nothing() {
        let logs: [RefCell<Vec<u16>>; 4] = Default::default();
        let mut servos = [
            Servo::new(RecordingPwm { log: &logs[0] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill1),
            Servo::new(RecordingPwm { log: &logs[1] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill2),
            Servo::new(RecordingPwm { log: &logs[2] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill3),
            Servo::new(RecordingPwm { log: &logs[3] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill4),
        ];
        let mut delay = InstantDelay { total_ms: 0 };

        block_on(execute(
            &mut servos,
            &[0, 0, 0, 0],
            &mut delay,
            &MotionProfile::default(),
        ));

        assert!(logs.iter().all(|log| log.borrow().is_empty()));
        assert_eq!(delay.total_ms, 0);
    }

    #[test]
    fn cycle_timing_follows_the_profile() {
        let logs: [RefCell<Vec<u16>>; 4] = Default::default();
        let mut servos = [
            Servo::new(RecordingPwm { log: &logs[0] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill1),
            Servo::new(RecordingPwm { log: &logs[1] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill2),
            Servo::new(RecordingPwm { log: &logs[2] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill3),
            Servo::new(RecordingPwm { log: &logs[3] }, FULL_SCALE, HertzU32::from_raw(50), Bin::Pill4),
        ];
        let mut delay = InstantDelay { total_ms: 0 };
        let profile = MotionProfile::default();

        block_on(execute(&mut servos, &[1, 0, 0, 0], &mut delay, &profile));

        // 42 sweep steps at 25 ms, 6 shake dwells at 50 ms, 200 ms settle.
        assert_eq!(delay.total_ms, 42 * 25 + 6 * 50 + 200);
    }
}
