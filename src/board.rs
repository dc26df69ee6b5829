//! # RP2350 Board Bindings
//!
//! Concrete peripherals behind the seams the control loop is written against:
//!
//! ```text
//! AnalogInput  <-  RpJoystickAdc  (ADC, GPIO26 / GPIO27)
//! SetDutyCycle <-  PwmOutput      (slice 6 B -> GPIO13 blue, slice 5 B -> GPIO11 red)
//! OutputPin    <-  Output         (GPIO12 green)
//! Panel        <-  Oled           (SSD1306 on I2C1, GPIO14 SDA / GPIO15 SCL)
//! ```

use defmt::*;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig};
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::i2c::{Blocking, Config as I2cConfig, I2c};
use embassy_rp::peripherals::{
    ADC, I2C1, PIN_11, PIN_12, PIN_13, PIN_14, PIN_15, PIN_26, PIN_27, PWM_SLICE5, PWM_SLICE6,
};
use embassy_rp::pwm::{Config as PwmConfig, Pwm, PwmOutput};
use embassy_rp::Peri;
use embedded_graphics::draw_target::DrawTarget;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use crate::constants::{i2c, pwm};
use crate::display::Panel;
use crate::joystick::{AnalogInput, Axis};

/// Both joystick axes on the shared converter.
pub struct RpJoystickAdc {
    adc: Adc<'static, embassy_rp::adc::Blocking>,
    x_channel: Channel<'static>,
    y_channel: Channel<'static>,
    selected: Axis,
}

impl RpJoystickAdc {
    pub fn new(
        adc: Peri<'static, ADC>,
        x_pin: Peri<'static, PIN_26>,
        y_pin: Peri<'static, PIN_27>,
    ) -> Self {
        Self {
            adc: Adc::new_blocking(adc, AdcConfig::default()),
            x_channel: Channel::new_pin(x_pin, Pull::None),
            y_channel: Channel::new_pin(y_pin, Pull::None),
            selected: Axis::Horizontal,
        }
    }
}

impl AnalogInput for RpJoystickAdc {
    fn select_channel(&mut self, axis: Axis) {
        // switch the input mux now so the settle delay runs on the new channel;
        // the conversion in `read` writes the same AINSEL value again
        embassy_rp::pac::ADC.cs().modify(|w| w.set_ainsel(axis.channel()));
        self.selected = axis;
    }

    fn read(&mut self) -> u16 {
        let channel = match self.selected {
            Axis::Horizontal => &mut self.x_channel,
            Axis::Vertical => &mut self.y_channel,
        };
        match self.adc.blocking_read(channel) {
            Ok(raw) => raw,
            Err(_) => {
                warn!("ADC conversion failed on {}", self.selected);
                0
            }
        }
    }
}

/// Slice configuration shared by both LED channels.
fn led_pwm_config() -> PwmConfig {
    let mut config = PwmConfig::default();
    config.top = pwm::PERIOD;
    config.divider = pwm::CLOCK_DIVIDER.into();
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// Blue LED on GPIO13. `None` only if the slice refuses to hand out channel B.
pub fn blue_led(
    slice: Peri<'static, PWM_SLICE6>,
    pin: Peri<'static, PIN_13>,
) -> Option<PwmOutput<'static>> {
    let (_, b) = Pwm::new_output_b(slice, pin, led_pwm_config()).split();
    b
}

/// Red LED on GPIO11.
pub fn red_led(
    slice: Peri<'static, PWM_SLICE5>,
    pin: Peri<'static, PIN_11>,
) -> Option<PwmOutput<'static>> {
    let (_, b) = Pwm::new_output_b(slice, pin, led_pwm_config()).split();
    b
}

pub fn green_led(pin: Peri<'static, PIN_12>) -> Output<'static> {
    Output::new(pin, Level::Low)
}

pub type Oled = Ssd1306<
    I2CInterface<I2c<'static, I2C1, Blocking>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

impl Panel for Oled {
    type FlushError = <Self as DrawTarget>::Error;

    fn flush_frame(&mut self) -> Result<(), Self::FlushError> {
        self.flush()
    }
}

/// Bring up the SSD1306. A failed init is logged; frames will then fail to
/// flush and the control loop keeps running without the screen.
pub fn oled(
    i2c1: Peri<'static, I2C1>,
    sda: Peri<'static, PIN_14>,
    scl: Peri<'static, PIN_15>,
) -> Oled {
    let mut config = I2cConfig::default();
    config.frequency = i2c::FAST_FREQUENCY_HZ;

    let bus = I2c::new_blocking(i2c1, scl, sda, config);
    let interface = I2CDisplayInterface::new_custom_address(bus, i2c::SSD1306_ADDR);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();

    match display.init() {
        Ok(()) => info!("SSD1306 ready at {=u8:#x}", i2c::SSD1306_ADDR),
        Err(_) => warn!("SSD1306 init failed, continuing without display"),
    }
    display
}
