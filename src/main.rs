#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::gpio::{Input, Pull};
use embassy_time::Delay;
#[cfg(not(feature = "polling-input"))]
use embassy_time::Duration;

use joystick_pwm::board;
use joystick_pwm::control::{ControlConfig, ControlLoop};
use joystick_pwm::joystick::JoystickSampler;
use joystick_pwm::pwm_controller::IndicatorDriver;
use joystick_pwm::status::STATUS;
use joystick_pwm::usb_serial::{self, send_sync_message};

#[cfg(not(feature = "polling-input"))]
use joystick_pwm::input::{get_button_receiver, watch_button, Button};
#[cfg(feature = "polling-input")]
use joystick_pwm::input::PolledButtons;

use {defmt_rtt as _, panic_probe as _};

#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

// Program metadata for `picotool info`.
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"Joystick-PWM"),
    embassy_rp::binary_info::rp_program_description!(
        c"Joystick-driven PWM LEDs with button toggles and an OLED cursor"
    ),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

/// Forwards falling edges of one button into the event channel.
#[cfg(not(feature = "polling-input"))]
#[embassy_executor::task(pool_size = 2)]
async fn button_edge_task(pin: Input<'static>, button: Button, window: Duration) -> ! {
    watch_button(pin, button, Delay, window).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    info!("Initializing Joystick-PWM");

    // USB serial carries the banner, toggle acknowledgments and heartbeat
    spawner.spawn(unwrap!(usb_serial::usb_serial_task(p.USB)));
    send_sync_message("Joystick-PWM");

    let config = ControlConfig::default();

    let adc = board::RpJoystickAdc::new(p.ADC, p.PIN_26, p.PIN_27);
    let sampler = JoystickSampler::with_settle_time(adc, Delay, config.settle_us);

    let blue = unwrap!(board::blue_led(p.PWM_SLICE6, p.PIN_13));
    let red = unwrap!(board::red_led(p.PWM_SLICE5, p.PIN_11));
    let indicators = IndicatorDriver::new(blue, red, board::green_led(p.PIN_12));

    #[cfg(feature = "display")]
    let viewport = joystick_pwm::display::Screen::new(
        board::oled(p.I2C1, p.PIN_14, p.PIN_15),
        config.geometry,
    );
    #[cfg(not(feature = "display"))]
    let viewport = ();

    // Buttons are active low with the internal pull-up
    let joystick_button = Input::new(p.PIN_22, Pull::Up);
    let button_a = Input::new(p.PIN_5, Pull::Up);

    let control = ControlLoop::new(sampler, indicators, viewport, config).publish_to(&STATUS);
    info!("Bindings: {}", control.config().bindings);

    #[cfg(not(feature = "polling-input"))]
    {
        let window = config.debounce_window;
        spawner.spawn(unwrap!(button_edge_task(joystick_button, Button::Joystick, window)));
        spawner.spawn(unwrap!(button_edge_task(button_a, Button::A, window)));
        control.run(get_button_receiver()).await;
    }

    #[cfg(feature = "polling-input")]
    {
        control
            .run(PolledButtons::new(joystick_button, button_a, config.debounce_window))
            .await;
    }
}
