//! Read-only copy of the control loop's state for the diagnostic heartbeat.
//!
//! The control loop is the only writer. Each field is one atomic word, so a
//! reader on another task may see fields from two neighbouring cycles but
//! never a torn value.

use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU8, Ordering};

use crate::constants::adc;
use crate::joystick::JoystickReading;
use crate::toggle::{BorderStyle, ToggleState};

pub struct ToggleSnapshot {
    green_led: AtomicBool,
    pwm_enabled: AtomicBool,
    border_style: AtomicU8,
    raw_x: AtomicU16,
    raw_y: AtomicU16,
    cycles: AtomicU32,
}

/// Published once per control cycle.
pub static STATUS: ToggleSnapshot = ToggleSnapshot::new();

impl ToggleSnapshot {
    pub const fn new() -> Self {
        Self {
            green_led: AtomicBool::new(false),
            pwm_enabled: AtomicBool::new(true),
            border_style: AtomicU8::new(0),
            raw_x: AtomicU16::new(adc::CENTER_VALUE),
            raw_y: AtomicU16::new(adc::CENTER_VALUE),
            cycles: AtomicU32::new(0),
        }
    }

    pub fn publish(&self, state: &ToggleState, reading: &JoystickReading) {
        self.green_led.store(state.green_led, Ordering::Relaxed);
        self.pwm_enabled.store(state.pwm_enabled, Ordering::Relaxed);
        self.border_style
            .store(state.border_style.index(), Ordering::Relaxed);
        self.raw_x.store(reading.x_axis.raw_value, Ordering::Relaxed);
        self.raw_y.store(reading.y_axis.raw_value, Ordering::Relaxed);
        self.cycles.fetch_add(1, Ordering::Relaxed);
    }

    pub fn state(&self) -> ToggleState {
        ToggleState {
            green_led: self.green_led.load(Ordering::Relaxed),
            pwm_enabled: self.pwm_enabled.load(Ordering::Relaxed),
            border_style: BorderStyle::from_index(self.border_style.load(Ordering::Relaxed)),
        }
    }

    pub fn reading(&self) -> JoystickReading {
        JoystickReading::new(
            self.raw_x.load(Ordering::Relaxed),
            self.raw_y.load(Ordering::Relaxed),
        )
    }

    /// Completed control cycles, wrapping.
    pub fn cycles(&self) -> u32 {
        self.cycles.load(Ordering::Relaxed)
    }
}

impl Default for ToggleSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
