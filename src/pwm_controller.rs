//! # PWM Controller Module
//!
//! Drives the indicator LEDs from the mapped joystick values:
//!
//! ```text
//! Control loop  ->  apply(duty, state)  ->  blue/red PWM channels + green GPIO
//! ```
//!
//! Duties are re-asserted on every cycle so the LEDs track the stick in real
//! time. Disabling the PWM indicators forces both channels to 0 rather than
//! freezing their last level.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::mapping::DutyPair;

/// Output seam used by the control loop.
pub trait Indicators {
    fn apply(&mut self, duty: DutyPair, pwm_enabled: bool, green_on: bool);
}

/// Two PWM channels plus one plain output.
pub struct IndicatorDriver<B, R, G> {
    blue: B,
    red: R,
    green: G,
}

impl<B, R, G> IndicatorDriver<B, R, G>
where
    B: SetDutyCycle,
    R: SetDutyCycle,
    G: OutputPin,
{
    pub fn new(blue: B, red: R, green: G) -> Self {
        let mut driver = Self { blue, red, green };
        driver.apply(DutyPair::default(), false, false);
        driver
    }
}

impl<B, R, G> Indicators for IndicatorDriver<B, R, G>
where
    B: SetDutyCycle,
    R: SetDutyCycle,
    G: OutputPin,
{
    fn apply(&mut self, duty: DutyPair, pwm_enabled: bool, green_on: bool) {
        let duty = if pwm_enabled { duty } else { DutyPair::default() };
        set_level(&mut self.blue, duty.blue);
        set_level(&mut self.red, duty.red);
        let _ = self.green.set_state(green_on.into());
    }
}

/// Write a duty level, clamped to what the channel can represent.
fn set_level<P: SetDutyCycle>(channel: &mut P, duty: u16) {
    let duty = duty.min(channel.max_duty_cycle());
    let _ = channel.set_duty_cycle(duty);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::pwm;
    use core::convert::Infallible;

    struct FakeChannel {
        max: u16,
        duty: u16,
        writes: usize,
    }

    impl FakeChannel {
        fn new(max: u16) -> Self {
            Self {
                max,
                duty: 0xFFFF,
                writes: 0,
            }
        }
    }

    impl embedded_hal::pwm::ErrorType for FakeChannel {
        type Error = Infallible;
    }

    impl SetDutyCycle for FakeChannel {
        fn max_duty_cycle(&self) -> u16 {
            self.max
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            assert!(duty <= self.max);
            self.duty = duty;
            self.writes += 1;
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeLed {
        on: bool,
    }

    impl embedded_hal::digital::ErrorType for FakeLed {
        type Error = Infallible;
    }

    impl OutputPin for FakeLed {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.on = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.on = true;
            Ok(())
        }
    }

    fn driver() -> IndicatorDriver<FakeChannel, FakeChannel, FakeLed> {
        IndicatorDriver::new(
            FakeChannel::new(pwm::PERIOD + 1),
            FakeChannel::new(pwm::PERIOD + 1),
            FakeLed::default(),
        )
    }

    #[test]
    fn starts_dark() {
        let IndicatorDriver { blue, red, green } = driver();
        assert_eq!((blue.duty, red.duty, green.on), (0, 0, false));
    }

    #[test]
    fn enabled_channels_follow_duty() {
        let mut driver = driver();

        driver.apply(DutyPair { blue: 1200, red: 4094 }, true, true);

        let IndicatorDriver { blue, red, green } = driver;
        assert_eq!(blue.duty, 1200);
        assert_eq!(red.duty, 4094);
        assert!(green.on);
    }

    #[test]
    fn disabled_channels_are_forced_to_zero() {
        let mut driver = driver();

        for duty in [0, 1, 2048, pwm::PERIOD] {
            driver.apply(DutyPair { blue: duty, red: duty }, true, false);
            driver.apply(DutyPair { blue: duty, red: duty }, false, false);
            assert_eq!((driver.blue.duty, driver.red.duty), (0, 0));
        }
    }

    #[test]
    fn levels_are_reasserted_every_cycle() {
        let mut driver = driver();

        for _ in 0..3 {
            driver.apply(DutyPair { blue: 10, red: 10 }, true, false);
        }

        let IndicatorDriver { blue, red, .. } = driver;
        // one write from construction plus one per cycle
        assert_eq!(blue.writes, 4);
        assert_eq!(red.writes, 4);
    }

    #[test]
    fn duty_is_clamped_to_channel_range() {
        let mut driver = IndicatorDriver::new(
            FakeChannel::new(1000),
            FakeChannel::new(1000),
            FakeLed::default(),
        );

        driver.apply(DutyPair { blue: 4000, red: 999 }, true, false);

        let IndicatorDriver { blue, red, .. } = driver;
        assert_eq!(blue.duty, 1000);
        assert_eq!(red.duty, 999);
    }

    #[test]
    fn green_is_independent_of_pwm_enable() {
        let mut driver = driver();

        driver.apply(DutyPair::default(), false, true);

        let IndicatorDriver { green, .. } = driver;
        assert!(green.on);
    }
}
