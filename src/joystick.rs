use embedded_hal::delay::DelayNs;
use heapless::String;

use crate::constants::{adc, buffers, pins};

/// Joystick axis, doubling as the converter channel it is wired to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    /// VRx on ADC0
    Horizontal,
    /// VRy on ADC1
    Vertical,
}

impl Axis {
    /// Converter input number for this axis
    pub const fn channel(self) -> u8 {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }

    /// GPIO the axis potentiometer is wired to
    pub const fn pin(self) -> u8 {
        match self {
            Axis::Horizontal => pins::JOYSTICK_X,
            Axis::Vertical => pins::JOYSTICK_Y,
        }
    }
}

/// Converter service consumed by the sampler.
///
/// `read` has no failure channel: implementations report a failed
/// conversion as 0, which is indistinguishable from a full-scale deflection.
pub trait AnalogInput {
    /// Route the converter input mux to `axis` immediately.
    ///
    /// The sampler waits out the settle time between this call and `read`, so
    /// implementations must not defer the switch to the conversion itself.
    fn select_channel(&mut self, axis: Axis);

    /// Convert the currently selected channel (0..=4095).
    fn read(&mut self) -> u16;
}

/// Anything that can produce one joystick reading per control cycle.
pub trait SampleSource {
    fn sample_axes(&mut self) -> JoystickReading;
}

/// Both axes from one sampling pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickReading {
    pub x_axis: AxisReading,
    pub y_axis: AxisReading,
}

/// One axis: raw sample plus the derived voltage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisReading {
    pub raw_value: u16,
    pub voltage_mv: u16,
    pub pin_number: u8,
}

impl JoystickReading {
    pub fn new(x_raw: u16, y_raw: u16) -> Self {
        Self {
            x_axis: AxisReading::new(x_raw, Axis::Horizontal.pin()),
            y_axis: AxisReading::new(y_raw, Axis::Vertical.pin()),
        }
    }

    /// Both axes resting at the fixed center point.
    pub fn neutral() -> Self {
        Self::new(adc::CENTER_VALUE, adc::CENTER_VALUE)
    }

    /// Diagnostic line with raw samples and volts.
    pub fn format_reading(&self) -> String<{ buffers::MESSAGE_BUFFER_SIZE }> {
        let mut msg: String<{ buffers::MESSAGE_BUFFER_SIZE }> = String::new();
        let _ = core::fmt::write(
            &mut msg,
            format_args!(
                "[JOYSTICK] Raw: ({}, {}) | V: ({}.{:03}V, {}.{:03}V)",
                self.x_axis.raw_value,
                self.y_axis.raw_value,
                self.x_axis.voltage_mv / 1000,
                self.x_axis.voltage_mv % 1000,
                self.y_axis.voltage_mv / 1000,
                self.y_axis.voltage_mv % 1000,
            ),
        );
        msg
    }
}

impl AxisReading {
    pub fn new(raw_value: u16, pin_number: u8) -> Self {
        Self {
            raw_value,
            voltage_mv: adc::raw_to_millivolts(raw_value),
            pin_number,
        }
    }
}

/// Reads both joystick axes from a shared converter.
pub struct JoystickSampler<A, D> {
    adc: A,
    delay: D,
    settle_us: u32,
}

impl<A, D> JoystickSampler<A, D>
where
    A: AnalogInput,
    D: DelayNs,
{
    pub fn new(adc: A, delay: D) -> Self {
        Self::with_settle_time(adc, delay, adc::SETTLE_TIME_US)
    }

    pub fn with_settle_time(adc: A, delay: D, settle_us: u32) -> Self {
        Self {
            adc,
            delay,
            settle_us,
        }
    }

    /// Sample the horizontal then the vertical axis.
    ///
    /// Each read is preceded by the channel-switch settle delay.
    pub fn sample_axes(&mut self) -> JoystickReading {
        let x_raw = self.read_axis(Axis::Horizontal);
        let y_raw = self.read_axis(Axis::Vertical);
        JoystickReading::new(x_raw, y_raw)
    }

    fn read_axis(&mut self, axis: Axis) -> u16 {
        self.adc.select_channel(axis);
        self.delay.delay_us(self.settle_us);
        self.adc.read()
    }
}

impl<A, D> SampleSource for JoystickSampler<A, D>
where
    A: AnalogInput,
    D: DelayNs,
{
    fn sample_axes(&mut self) -> JoystickReading {
        JoystickSampler::sample_axes(self)
    }
}
