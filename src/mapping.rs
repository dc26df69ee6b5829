//! # Signal Mapping Module
//!
//! Pure conversions from raw joystick samples to output values:
//!
//! ```text
//! raw (0..=4095) ──┬─> to_duty   ──> PWM compare level (deflection magnitude)
//!                  └─> to_screen ──> cursor coordinate (signed deflection)
//! ```
//!
//! Both are centered on the fixed [`adc::CENTER_VALUE`]. The duty path is
//! symmetric: pushing the stick either way brightens the LED by the same
//! amount. The screen path keeps the sign and saturates at the panel edges.

use crate::constants::{adc, display, pwm};
use crate::joystick::JoystickReading;

/// Convert a raw axis value to a PWM duty level.
///
/// `duty = 2 * |value - CENTER|`, saturated at [`pwm::PERIOD`]. The saturation
/// only matters for a raw 0, whose distance from center is one count larger
/// than that of the maximum reading.
pub fn to_duty(value: u16) -> u16 {
    let deflection = value.abs_diff(adc::CENTER_VALUE) as u32;
    (deflection * 2).min(pwm::PERIOD as u32) as u16
}

/// Rescale a raw axis value into `0..=extent`.
///
/// Neutral maps to `extent / 2`; full deflection approaches the edges.
/// Values that would fall outside the range are clamped, never wrapped.
pub fn to_screen(value: u16, center: u16, extent: i32) -> i32 {
    let offset = value as i32 - center as i32;
    let half = extent / 2;
    let mapped = (offset * half) / adc::CENTER_VALUE as i32 + half;
    mapped.clamp(0, extent.max(0))
}

/// Panel size and cursor size used to place the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScreenGeometry {
    pub width: u32,
    pub height: u32,
    pub cursor_size: u32,
}

impl ScreenGeometry {
    /// Largest x the cursor's top-left corner may take.
    pub fn x_extent(&self) -> i32 {
        self.width.saturating_sub(self.cursor_size) as i32
    }

    /// Largest y the cursor's top-left corner may take.
    pub fn y_extent(&self) -> i32 {
        self.height.saturating_sub(self.cursor_size) as i32
    }
}

impl Default for ScreenGeometry {
    fn default() -> Self {
        Self {
            width: display::SCREEN_WIDTH,
            height: display::SCREEN_HEIGHT,
            cursor_size: display::CURSOR_SIZE,
        }
    }
}

/// Top-left corner of the cursor square, in panel pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScreenPosition {
    pub x: i32,
    pub y: i32,
}

/// Duty levels for the two PWM indicators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyPair {
    /// Blue LED, driven by the vertical axis
    pub blue: u16,
    /// Red LED, driven by the horizontal axis
    pub red: u16,
}

impl DutyPair {
    pub fn from_reading(reading: &JoystickReading) -> Self {
        Self {
            blue: to_duty(reading.y_axis.raw_value),
            red: to_duty(reading.x_axis.raw_value),
        }
    }
}

/// Place the cursor for a reading.
///
/// The vertical axis is inverted so pushing the stick up moves the cursor
/// toward row 0.
pub fn screen_position(reading: &JoystickReading, geometry: &ScreenGeometry) -> ScreenPosition {
    let x_extent = geometry.x_extent();
    let y_extent = geometry.y_extent();
    ScreenPosition {
        x: to_screen(reading.x_axis.raw_value, adc::CENTER_VALUE, x_extent),
        y: y_extent - to_screen(reading.y_axis.raw_value, adc::CENTER_VALUE, y_extent),
    }
}
