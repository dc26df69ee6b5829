//! # Control Loop
//!
//! One context object owns every stage and runs them in a fixed order each
//! cycle:
//!
//! ```text
//! button events -> toggle state machine
//!                       |
//! sample axes -> map -> drive LEDs -> render
//! ```
//!
//! Presses are applied before anything is driven, so the outputs of a cycle
//! always reflect the toggle state as of the start of that cycle.

use embassy_time::{Duration, Instant, Ticker};

use crate::constants::{adc, timing};
use crate::display::Viewport;
use crate::input::{ButtonEvent, InputSource};
use crate::joystick::{JoystickReading, SampleSource};
use crate::log_info;
use crate::mapping::{screen_position, DutyPair, ScreenGeometry, ScreenPosition};
use crate::pwm_controller::Indicators;
use crate::status::ToggleSnapshot;
use crate::toggle::{Bindings, ToggleState, ToggleStateMachine, Transition};

/// Control loop configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlConfig {
    /// Time between cycle starts
    pub cycle_period: Duration,
    /// Minimum spacing between accepted presses of one button
    pub debounce_window: Duration,
    /// Converter settle time after a channel switch, in microseconds
    pub settle_us: u32,
    pub bindings: Bindings,
    pub geometry: ScreenGeometry,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            cycle_period: Duration::from_millis(timing::CYCLE_PERIOD_MS),
            debounce_window: Duration::from_millis(timing::DEBOUNCE_WINDOW_MS),
            settle_us: adc::SETTLE_TIME_US,
            bindings: Bindings::default(),
            geometry: ScreenGeometry::default(),
        }
    }
}

/// What one cycle read and produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cycle {
    pub reading: JoystickReading,
    pub duty: DutyPair,
    pub position: ScreenPosition,
    pub state: ToggleState,
    /// Transitions accepted at the start of this cycle
    pub transitions: u8,
    pub rendered: bool,
}

pub struct ControlLoop<S, I, V> {
    sampler: S,
    indicators: I,
    viewport: V,
    toggles: ToggleStateMachine,
    config: ControlConfig,
    status: Option<&'static ToggleSnapshot>,
}

impl<S, I, V> ControlLoop<S, I, V>
where
    S: SampleSource,
    I: Indicators,
    V: Viewport,
{
    pub fn new(sampler: S, indicators: I, viewport: V, config: ControlConfig) -> Self {
        Self {
            sampler,
            indicators,
            viewport,
            toggles: ToggleStateMachine::new(config.bindings, config.debounce_window),
            config,
            status: None,
        }
    }

    /// Mirror each cycle's state into `snapshot` for other tasks to read.
    pub fn publish_to(mut self, snapshot: &'static ToggleSnapshot) -> Self {
        self.status = Some(snapshot);
        self
    }

    pub fn state(&self) -> ToggleState {
        self.toggles.state()
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Run a single cycle with the presses gathered for it.
    pub fn step<E>(&mut self, events: E) -> Cycle
    where
        E: IntoIterator<Item = ButtonEvent>,
    {
        let mut transitions = 0u8;
        for event in events {
            if let Some(transition) = self.toggles.handle(event) {
                acknowledge(&transition);
                transitions = transitions.saturating_add(1);
            }
        }
        let state = self.toggles.state();

        let reading = self.sampler.sample_axes();
        let duty = DutyPair::from_reading(&reading);
        let position = screen_position(&reading, &self.config.geometry);

        self.indicators
            .apply(duty, state.pwm_enabled, state.green_led);

        let rendered = self.viewport.show(position, state.border_style);
        if !rendered {
            #[cfg(feature = "defmt")]
            defmt::warn!("Display frame dropped");
        }

        if let Some(status) = self.status {
            status.publish(&state, &reading);
        }

        Cycle {
            reading,
            duty,
            position,
            state,
            transitions,
            rendered,
        }
    }

    /// Cycle forever at the configured period.
    pub async fn run<E: InputSource>(mut self, mut input: E) -> ! {
        #[cfg(feature = "defmt")]
        defmt::info!(
            "Control loop running every {} ms, bindings {}",
            self.config.cycle_period.as_millis(),
            self.config.bindings
        );

        let mut ticker = Ticker::every(self.config.cycle_period);
        loop {
            let events = input.events(Instant::now());
            self.step(events);
            ticker.next().await;
        }
    }
}

/// Report an accepted press on the diagnostic stream.
fn acknowledge(transition: &Transition) {
    #[cfg(feature = "defmt")]
    defmt::info!(
        "{} button: {} -> {}",
        transition.button.name(),
        transition.applied,
        transition.state
    );

    let state = &transition.state;
    if transition.applied.toggle_green {
        log_info!("Green LED: {}", if state.green_led { "on" } else { "off" });
    }
    if transition.applied.toggle_pwm {
        log_info!(
            "PWM LEDs: {}",
            if state.pwm_enabled { "enabled" } else { "disabled" }
        );
    }
    if transition.applied.cycle_border {
        log_info!("Border: {}", state.border_style.name());
    }
}
