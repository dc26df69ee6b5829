//! # Button Input Module
//!
//! Produces [`ButtonEvent`]s for the toggle state machine. Two strategies, one
//! per build:
//!
//! ```text
//! edge-triggered:  GPIO IRQ -> button_edge_task -> BUTTON_EVENTS -> control loop
//! polling:         control loop -> PollingInput::poll -> events (same cycle)
//! ```
//!
//! Either way only a released -> pressed transition produces an event, a
//! button is re-armed only after staying released for the debounce window,
//! and the state change itself always happens on the control loop.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Instant};
use embedded_hal::digital::InputPin;
use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::digital::Wait;
use heapless::Vec;

use crate::constants::{buffers, timing};

/// Physical buttons on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Push switch under the joystick
    Joystick,
    /// Button A
    A,
}

impl Button {
    pub const COUNT: usize = 2;
    pub const ALL: [Button; Button::COUNT] = [Button::Joystick, Button::A];

    pub const fn index(self) -> usize {
        match self {
            Button::Joystick => 0,
            Button::A => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Button::Joystick => "joystick",
            Button::A => "A",
        }
    }
}

/// A detected press and when it happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    pub button: Button,
    pub at: Instant,
}

/// Presses reported by the edge-triggered button tasks.
///
/// Critical-section mutex because senders run in interrupt-woken tasks.
pub static BUTTON_EVENTS: Channel<
    CriticalSectionRawMutex,
    ButtonEvent,
    { buffers::BUTTON_EVENT_DEPTH },
> = Channel::new();

pub type ButtonEventSender =
    Sender<'static, CriticalSectionRawMutex, ButtonEvent, { buffers::BUTTON_EVENT_DEPTH }>;
pub type ButtonEventReceiver =
    Receiver<'static, CriticalSectionRawMutex, ButtonEvent, { buffers::BUTTON_EVENT_DEPTH }>;

/// Get the button event sender
pub fn get_button_sender() -> ButtonEventSender {
    BUTTON_EVENTS.sender()
}

/// Get the button event receiver
pub fn get_button_receiver() -> ButtonEventReceiver {
    BUTTON_EVENTS.receiver()
}

/// Iterate over every event queued so far without waiting.
pub fn drain_events(receiver: &ButtonEventReceiver) -> impl Iterator<Item = ButtonEvent> + '_ {
    core::iter::from_fn(move || receiver.try_receive().ok())
}

/// Presses gathered at the start of one control cycle.
pub type CycleEvents = Vec<ButtonEvent, { buffers::BUTTON_EVENT_DEPTH }>;

/// Where the control loop gets its button presses from.
pub trait InputSource {
    /// Everything pressed since the previous call.
    fn events(&mut self, now: Instant) -> CycleEvents;
}

/// Edge-triggered deployments: the button tasks already queued the presses.
impl InputSource for ButtonEventReceiver {
    fn events(&mut self, _now: Instant) -> CycleEvents {
        // presses landing mid-drain wait for the next cycle
        drain_events(self)
            .take(buffers::BUTTON_EVENT_DEPTH)
            .collect()
    }
}

/// Turns a sampled "is pressed" level into press edges.
///
/// Holding the button produces a single edge and releasing produces none. After
/// a press the detector stays disarmed until the level has read released for
/// the whole debounce window, so contact bounce on release is swallowed.
pub struct EdgeDetector {
    button: Button,
    window: Duration,
    armed: bool,
    released_since: Option<Instant>,
}

impl EdgeDetector {
    pub fn new(button: Button, window: Duration) -> Self {
        Self {
            button,
            window,
            armed: true,
            released_since: None,
        }
    }

    pub fn sample(&mut self, pressed: bool, now: Instant) -> Option<ButtonEvent> {
        if pressed {
            self.released_since = None;
            if !self.armed {
                return None;
            }
            self.armed = false;
            return Some(ButtonEvent {
                button: self.button,
                at: now,
            });
        }

        let since = *self.released_since.get_or_insert(now);
        if now
            .checked_duration_since(since)
            .is_some_and(|released| released >= self.window)
        {
            self.armed = true;
        }
        None
    }
}

/// Polled input source: one edge detector per button, sampled once a cycle.
pub struct PollingInput {
    detectors: [EdgeDetector; Button::COUNT],
}

impl PollingInput {
    pub fn new(window: Duration) -> Self {
        Self {
            detectors: Button::ALL.map(|button| EdgeDetector::new(button, window)),
        }
    }

    /// Feed the current pressed levels, indexed by [`Button::index`].
    pub fn poll(
        &mut self,
        pressed: [bool; Button::COUNT],
        now: Instant,
    ) -> Vec<ButtonEvent, { Button::COUNT }> {
        let mut events = Vec::new();
        for (detector, level) in self.detectors.iter_mut().zip(pressed) {
            if let Some(event) = detector.sample(level, now) {
                // capacity equals the detector count
                let _ = events.push(event);
            }
        }
        events
    }
}

impl Default for PollingInput {
    fn default() -> Self {
        Self::new(Duration::from_millis(timing::DEBOUNCE_WINDOW_MS))
    }
}

/// Polled deployments: read both active-low pins once a cycle.
pub struct PolledButtons<J, A> {
    joystick: J,
    button_a: A,
    input: PollingInput,
}

impl<J: InputPin, A: InputPin> PolledButtons<J, A> {
    pub fn new(joystick: J, button_a: A, window: Duration) -> Self {
        Self {
            joystick,
            button_a,
            input: PollingInput::new(window),
        }
    }
}

impl<J: InputPin, A: InputPin> InputSource for PolledButtons<J, A> {
    fn events(&mut self, now: Instant) -> CycleEvents {
        // a pin that cannot be read counts as released
        let pressed = [
            self.joystick.is_low().unwrap_or(false),
            self.button_a.is_low().unwrap_or(false),
        ];
        self.input.poll(pressed, now).into_iter().collect()
    }
}

/// Wait for the next falling edge on an active-low button and queue it.
///
/// Returns `false` when the pin reported an error; the event is not sent.
pub async fn forward_next_press<P: Wait>(
    pin: &mut P,
    button: Button,
    sender: &ButtonEventSender,
) -> bool {
    if pin.wait_for_falling_edge().await.is_err() {
        return false;
    }
    let event = ButtonEvent {
        button,
        at: Instant::now(),
    };
    if sender.try_send(event).is_err() {
        #[cfg(feature = "defmt")]
        defmt::warn!("Button channel full, dropping {} press", button.name());
    }
    true
}

/// Return once the button has read released for `window_ms` without a break.
///
/// Any low level inside the window is bounce (or a press too soon to count)
/// and restarts the wait.
pub async fn wait_for_quiet_release<P: Wait, D: DelayNs>(
    pin: &mut P,
    delay: &mut D,
    window_ms: u32,
) -> Result<(), P::Error> {
    loop {
        pin.wait_for_high().await?;
        match select(pin.wait_for_low(), delay.delay_ms(window_ms)).await {
            Either::First(bounce) => bounce?,
            Either::Second(()) => return Ok(()),
        }
    }
}

/// Edge-triggered input source for one button. Never returns.
pub async fn watch_button<P: Wait, D: DelayNs>(
    mut pin: P,
    button: Button,
    mut delay: D,
    window: Duration,
) -> ! {
    #[cfg(feature = "defmt")]
    defmt::info!("Watching {} button for falling edges", button.name());

    let window_ms = u32::try_from(window.as_millis()).unwrap_or(u32::MAX);
    let sender = get_button_sender();
    loop {
        let pressed = forward_next_press(&mut pin, button, &sender).await;
        if !pressed || wait_for_quiet_release(&mut pin, &mut delay, window_ms).await.is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("{} button wait failed", button.name());
        }
    }
}
