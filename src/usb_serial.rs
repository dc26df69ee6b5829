//! # USB Serial Diagnostics
//!
//! Output-only text stream for the boot banner, toggle acknowledgments and a
//! periodic heartbeat. Any module can queue a line with [`log_info!`]; the USB
//! task forwards queued lines to the host terminal while one is attached.
//! Lines queued while the channel is full are dropped, never waited on.
//! Nothing the host sends is interpreted.

use core::fmt::Write;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};
use heapless::String;

use crate::constants::buffers;
use crate::status::ToggleSnapshot;

/// One queued diagnostic line.
#[derive(Clone, Debug)]
pub enum SerialMessage {
    Text(&'static str),
    Formatted(String<{ buffers::MESSAGE_BUFFER_SIZE }>),
}

impl SerialMessage {
    pub fn as_str(&self) -> &str {
        match self {
            SerialMessage::Text(text) => *text,
            SerialMessage::Formatted(text) => text.as_str(),
        }
    }
}

pub type SerialSender =
    Sender<'static, CriticalSectionRawMutex, SerialMessage, { buffers::SERIAL_CHANNEL_DEPTH }>;

/// Lines waiting for the host terminal.
pub static SERIAL_CHANNEL: Channel<
    CriticalSectionRawMutex,
    SerialMessage,
    { buffers::SERIAL_CHANNEL_DEPTH },
> = Channel::new();

pub fn get_serial_sender() -> SerialSender {
    SERIAL_CHANNEL.sender()
}

/// Queue a static line without waiting.
pub fn send_sync_message(message: &'static str) {
    let _ = get_serial_sender().try_send(SerialMessage::Text(message));
}

pub fn send_sync_formatted_message(message: String<{ buffers::MESSAGE_BUFFER_SIZE }>) {
    let _ = get_serial_sender().try_send(SerialMessage::Formatted(message));
}

/// Format a line and queue it; text past the buffer size is cut off.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        let mut msg: heapless::String<{ $crate::constants::buffers::MESSAGE_BUFFER_SIZE }> =
            heapless::String::new();
        let _ = core::fmt::write(&mut msg, format_args!($($arg)*));
        $crate::usb_serial::send_sync_formatted_message(msg);
    }};
}

/// Periodic summary of the published control state.
pub fn heartbeat_line(count: u32, status: &ToggleSnapshot) -> String<{ buffers::MESSAGE_BUFFER_SIZE }> {
    let state = status.state();
    let reading = status.reading();
    let mut line = String::new();
    let _ = write!(
        line,
        "[HEARTBEAT] #{} | cycles: {} | green: {} | pwm: {} | border: {} | stick: ({}, {})",
        count,
        status.cycles(),
        if state.green_led { "on" } else { "off" },
        if state.pwm_enabled { "enabled" } else { "disabled" },
        state.border_style.name(),
        reading.x_axis.raw_value,
        reading.y_axis.raw_value,
    );
    line
}

#[cfg(feature = "firmware")]
pub use stream::usb_serial_task;

#[cfg(feature = "firmware")]
mod stream {
    use embassy_futures::join::join;
    use embassy_futures::select::{select, Either};
    use embassy_rp::peripherals::USB;
    use embassy_rp::usb::{Driver, InterruptHandler};
    use embassy_rp::{bind_interrupts, Peri};
    use embassy_time::{Duration, Ticker};
    use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
    use embassy_usb::driver::EndpointError;
    use embassy_usb::{Builder, Config};

    use super::{heartbeat_line, SERIAL_CHANNEL};
    use crate::constants::{buffers, timing};
    use crate::status::STATUS;

    bind_interrupts!(struct UsbIrqs {
        USBCTRL_IRQ => InterruptHandler<USB>;
    });

    type Class<'d> = CdcAcmClass<'d, Driver<'d, USB>>;

    /// CDC ACM output. Drains [`SERIAL_CHANNEL`] while a host is attached.
    #[embassy_executor::task]
    pub async fn usb_serial_task(usb: Peri<'static, USB>) -> ! {
        let mut usb_config = Config::new(0xc0de, 0xcafe);
        usb_config.manufacturer = Some("Raspberry Pi");
        usb_config.product = Some("Joystick PWM Diagnostics");
        usb_config.serial_number = Some("JPWM0001");
        usb_config.max_power = 100;
        usb_config.max_packet_size_0 = buffers::USB_PACKET_SIZE as u8;

        let mut config_descriptor = [0; 256];
        let mut bos_descriptor = [0; 256];
        let mut control_buf = [0; buffers::USB_PACKET_SIZE];
        let mut cdc_state = State::new();

        let mut builder = Builder::new(
            Driver::new(usb, UsbIrqs),
            usb_config,
            &mut config_descriptor,
            &mut bos_descriptor,
            &mut [],
            &mut control_buf,
        );
        let mut class = CdcAcmClass::new(&mut builder, &mut cdc_state, buffers::USB_PACKET_SIZE as u16);
        let mut device = builder.build();

        join(device.run(), serve(&mut class)).await;
        core::unreachable!()
    }

    async fn serve(class: &mut Class<'_>) {
        let messages = SERIAL_CHANNEL.receiver();

        loop {
            class.wait_connection().await;
            defmt::info!("USB Serial connected");

            let mut beats = 0u32;
            let mut heartbeat = Ticker::every(Duration::from_millis(timing::USB_HEARTBEAT_MS));

            let mut written: Result<(), EndpointError> = Ok(());
            while written.is_ok() {
                written = match select(messages.receive(), heartbeat.next()).await {
                    Either::First(message) => write_line(class, message.as_str().as_bytes()).await,
                    Either::Second(()) => {
                        beats = beats.wrapping_add(1);
                        write_line(class, heartbeat_line(beats, &STATUS).as_bytes()).await
                    }
                };
            }
            defmt::info!("USB Serial disconnected");
        }
    }

    /// Write one CRLF-terminated line in CDC-sized packets.
    async fn write_line(class: &mut Class<'_>, text: &[u8]) -> Result<(), EndpointError> {
        for chunk in text.chunks(buffers::USB_PACKET_SIZE) {
            class.write_packet(chunk).await?;
        }
        class.write_packet(b"\r\n").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joystick::JoystickReading;
    use crate::toggle::{BorderStyle, ToggleState};

    #[test]
    fn message_text_is_exposed_for_both_kinds() {
        assert_eq!(SerialMessage::Text("Joystick-PWM").as_str(), "Joystick-PWM");

        let mut formatted = String::new();
        formatted.push_str("Border: thin").unwrap();
        assert_eq!(SerialMessage::Formatted(formatted).as_str(), "Border: thin");
    }

    #[test]
    fn heartbeat_summarises_snapshot() {
        let snapshot = ToggleSnapshot::new();
        snapshot.publish(
            &ToggleState {
                green_led: true,
                pwm_enabled: false,
                border_style: BorderStyle::Thick,
            },
            &JoystickReading::new(4095, 2048),
        );

        assert_eq!(
            heartbeat_line(3, &snapshot).as_str(),
            "[HEARTBEAT] #3 | cycles: 1 | green: on | pwm: disabled | border: thick | stick: (4095, 2048)"
        );
    }

    #[test]
    fn heartbeat_fits_one_message() {
        let snapshot = ToggleSnapshot::new();
        let line = heartbeat_line(u32::MAX, &snapshot);
        assert!(line.ends_with(")"));
    }
}
