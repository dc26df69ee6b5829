//! # Board and Timing Constants
//!
//! Grouped by peripheral. Pin numbers follow the BitDogLab board layout.

/// Joystick converter
pub mod adc {
    /// Full-scale 12-bit sample
    pub const MAX_VALUE: u16 = 4095;

    /// Joystick neutral position (MAX_VALUE / 2 + 1). Fixed, never calibrated at runtime.
    pub const CENTER_VALUE: u16 = MAX_VALUE / 2 + 1;

    /// Converter reference, mV
    pub const REFERENCE_VOLTAGE_MV: u16 = 3300;

    /// Channel-switch settling time before a conversion (microseconds)
    pub const SETTLE_TIME_US: u32 = 2;

    /// Raw sample to millivolts, for diagnostics only
    pub const fn raw_to_millivolts(raw: u16) -> u16 {
        ((raw as u32 * REFERENCE_VOLTAGE_MV as u32) / MAX_VALUE as u32) as u16
    }
}

/// LED PWM slices
pub mod pwm {
    /// Counter wrap value; duty values live in `0..=PERIOD`
    pub const PERIOD: u16 = 4095;

    /// Integer clock divider for the LED slices
    pub const CLOCK_DIVIDER: u8 = 16;
}

/// GPIO assignments
pub mod pins {
    /// Joystick horizontal axis (ADC0)
    pub const JOYSTICK_X: u8 = 26;

    /// Joystick vertical axis (ADC1)
    pub const JOYSTICK_Y: u8 = 27;

    /// Joystick push switch, active low
    pub const JOYSTICK_BUTTON: u8 = 22;

    /// Button A, active low
    pub const BUTTON_A: u8 = 5;

    /// Red LED (PWM slice 5, channel B)
    pub const LED_RED: u8 = 11;

    /// Green LED (plain output)
    pub const LED_GREEN: u8 = 12;

    /// Blue LED (PWM slice 6, channel B)
    pub const LED_BLUE: u8 = 13;

    /// I2C1 data line to the OLED
    pub const I2C_SDA: u8 = 14;

    /// I2C1 clock line to the OLED
    pub const I2C_SCL: u8 = 15;
}

/// Timing, in milliseconds
pub mod timing {
    /// Control loop period (10ms = 100Hz)
    pub const CYCLE_PERIOD_MS: u64 = 10;

    /// Minimum dwell after an accepted button press
    pub const DEBOUNCE_WINDOW_MS: u64 = 300;

    /// Diagnostic heartbeat interval
    pub const USB_HEARTBEAT_MS: u64 = 10000;
}

/// OLED geometry
pub mod display {
    /// SSD1306 width in pixels
    pub const SCREEN_WIDTH: u32 = 128;

    /// SSD1306 height in pixels
    pub const SCREEN_HEIGHT: u32 = 64;

    /// Side of the cursor square in pixels
    pub const CURSOR_SIZE: u32 = 8;

    /// Offset of the thick border from the screen edge
    pub const THICK_BORDER_INSET: u32 = 2;
}

/// OLED bus
pub mod i2c {
    /// Fast-mode bus clock
    pub const FAST_FREQUENCY_HZ: u32 = 400_000;

    /// SSD1306 7-bit address
    pub const SSD1306_ADDR: u8 = 0x3C;
}

/// Buffer and queue sizes
pub mod buffers {
    /// CDC ACM max packet
    pub const USB_PACKET_SIZE: usize = 64;

    /// One `log_info!` line
    pub const MESSAGE_BUFFER_SIZE: usize = 128;

    /// Button event channel depth
    pub const BUTTON_EVENT_DEPTH: usize = 8;

    /// Queued diagnostic lines
    pub const SERIAL_CHANNEL_DEPTH: usize = 10;
}
