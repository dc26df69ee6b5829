//! # Toggle State Machine
//!
//! Owns the three user-visible states and moves them on button presses.
//!
//! | Button          | Effect (display build)            | Effect (LED-only build) |
//! |-----------------|-----------------------------------|-------------------------|
//! | Joystick switch | toggle green LED, next border     | toggle green LED        |
//! | Button A        | enable/disable the PWM indicators | same                    |
//!
//! Presses arrive as [`ButtonEvent`]s from either input strategy. A press is
//! dropped when it lands inside the debounce window of the last accepted
//! press from the same button.

use embassy_time::{Duration, Instant};

use crate::constants::timing;
use crate::input::{Button, ButtonEvent};

/// Frame drawn around the display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BorderStyle {
    #[default]
    None = 0,
    /// Single line along the panel edge
    Thin = 1,
    /// Single line inset from the panel edge
    Thick = 2,
}

impl BorderStyle {
    /// Next style in the `None -> Thin -> Thick -> None` cycle.
    pub const fn next(self) -> Self {
        match self {
            BorderStyle::None => BorderStyle::Thin,
            BorderStyle::Thin => BorderStyle::Thick,
            BorderStyle::Thick => BorderStyle::None,
        }
    }

    /// Decode a stored discriminant; anything out of range wraps into the cycle.
    pub const fn from_index(index: u8) -> Self {
        match index % 3 {
            0 => BorderStyle::None,
            1 => BorderStyle::Thin,
            _ => BorderStyle::Thick,
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    pub const fn name(self) -> &'static str {
        match self {
            BorderStyle::None => "none",
            BorderStyle::Thin => "thin",
            BorderStyle::Thick => "thick",
        }
    }
}

/// Snapshot of every user-controlled output state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToggleState {
    pub green_led: bool,
    pub pwm_enabled: bool,
    pub border_style: BorderStyle,
}

impl Default for ToggleState {
    fn default() -> Self {
        Self {
            green_led: false,
            pwm_enabled: true,
            border_style: BorderStyle::None,
        }
    }
}

/// Effects a single button press applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Effects {
    pub toggle_green: bool,
    pub toggle_pwm: bool,
    pub cycle_border: bool,
}

impl Effects {
    pub const NONE: Self = Self {
        toggle_green: false,
        toggle_pwm: false,
        cycle_border: false,
    };

    pub const fn is_empty(&self) -> bool {
        !(self.toggle_green || self.toggle_pwm || self.cycle_border)
    }
}

/// Which effects each button is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Bindings {
    pub joystick: Effects,
    pub button_a: Effects,
}

impl Bindings {
    /// LED-only board: the stick switch only toggles the green LED.
    pub const fn led_only() -> Self {
        Self {
            joystick: Effects {
                toggle_green: true,
                ..Effects::NONE
            },
            button_a: Effects {
                toggle_pwm: true,
                ..Effects::NONE
            },
        }
    }

    /// With the OLED: the stick switch also advances the border style.
    pub const fn with_display() -> Self {
        Self {
            joystick: Effects {
                toggle_green: true,
                cycle_border: true,
                ..Effects::NONE
            },
            button_a: Effects {
                toggle_pwm: true,
                ..Effects::NONE
            },
        }
    }

    pub const fn for_button(&self, button: Button) -> Effects {
        match button {
            Button::Joystick => self.joystick,
            Button::A => self.button_a,
        }
    }
}

impl Default for Bindings {
    fn default() -> Self {
        if cfg!(feature = "display") {
            Self::with_display()
        } else {
            Self::led_only()
        }
    }
}

/// An accepted press and the state it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    pub button: Button,
    pub applied: Effects,
    pub state: ToggleState,
}

pub struct ToggleStateMachine {
    state: ToggleState,
    bindings: Bindings,
    window: Duration,
    last_accepted: [Option<Instant>; Button::COUNT],
}

impl ToggleStateMachine {
    pub fn new(bindings: Bindings, window: Duration) -> Self {
        Self {
            state: ToggleState::default(),
            bindings,
            window,
            last_accepted: [None; Button::COUNT],
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// Apply one press.
    ///
    /// Returns `None` when the press falls inside the debounce window or the
    /// button has no effects bound.
    pub fn handle(&mut self, event: ButtonEvent) -> Option<Transition> {
        let slot = &mut self.last_accepted[event.button.index()];
        if let Some(last) = *slot {
            // events can be queued out of order across buttons but never
            // within one; treat a non-monotonic stamp as inside the window
            let elapsed = event.at.checked_duration_since(last);
            if elapsed.map_or(true, |elapsed| elapsed < self.window) {
                return None;
            }
        }

        let effects = self.bindings.for_button(event.button);
        if effects.is_empty() {
            return None;
        }
        *slot = Some(event.at);

        if effects.toggle_green {
            self.state.green_led = !self.state.green_led;
        }
        if effects.toggle_pwm {
            self.state.pwm_enabled = !self.state.pwm_enabled;
        }
        if effects.cycle_border {
            self.state.border_style = self.state.border_style.next();
        }

        Some(Transition {
            button: event.button,
            applied: effects,
            state: self.state,
        })
    }
}

impl Default for ToggleStateMachine {
    fn default() -> Self {
        Self::new(
            Bindings::default(),
            Duration::from_millis(timing::DEBOUNCE_WINDOW_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    fn press(button: Button, at_ms: u64) -> ButtonEvent {
        ButtonEvent {
            button,
            at: Instant::from_millis(at_ms),
        }
    }

    fn machine() -> ToggleStateMachine {
        ToggleStateMachine::new(Bindings::with_display(), Duration::from_millis(300))
    }

    #[test]
    fn starts_with_pwm_on_and_no_border() {
        assert_eq!(
            ToggleStateMachine::default().state(),
            ToggleState {
                green_led: false,
                pwm_enabled: true,
                border_style: BorderStyle::None,
            }
        );
    }

    #[test]
    fn joystick_press_toggles_green_and_cycles_border() {
        let mut sm = machine();

        let transition = sm.handle(press(Button::Joystick, 1000)).unwrap();

        assert_eq!(transition.button, Button::Joystick);
        assert!(transition.applied.toggle_green && transition.applied.cycle_border);
        assert!(sm.state().green_led);
        assert!(sm.state().pwm_enabled);
        assert_eq!(sm.state().border_style, BorderStyle::Thin);
    }

    #[test]
    fn button_a_only_touches_pwm() {
        let mut sm = machine();

        sm.handle(press(Button::A, 1000)).unwrap();

        assert_eq!(
            sm.state(),
            ToggleState {
                green_led: false,
                pwm_enabled: false,
                border_style: BorderStyle::None,
            }
        );
    }

    #[test]
    fn presses_inside_window_collapse() {
        let mut sm = machine();

        assert!(sm.handle(press(Button::Joystick, 1000)).is_some());
        assert!(sm.handle(press(Button::Joystick, 1005)).is_none());
        assert!(sm.handle(press(Button::Joystick, 1299)).is_none());

        assert!(sm.state().green_led);
        assert_eq!(sm.state().border_style, BorderStyle::Thin);
    }

    #[test]
    fn presses_outside_window_both_count() {
        let mut sm = machine();

        assert!(sm.handle(press(Button::Joystick, 1000)).is_some());
        assert!(sm.handle(press(Button::Joystick, 1300)).is_some());

        assert!(!sm.state().green_led);
        assert_eq!(sm.state().border_style, BorderStyle::Thick);
    }

    #[test]
    fn rejected_press_does_not_extend_window() {
        let mut sm = machine();

        sm.handle(press(Button::A, 1000)).unwrap();
        assert!(sm.handle(press(Button::A, 1200)).is_none());
        // window is measured from the accepted press at 1000
        assert!(sm.handle(press(Button::A, 1300)).is_some());
        assert!(sm.state().pwm_enabled);
    }

    #[test]
    fn windows_are_per_button() {
        let mut sm = machine();

        assert!(sm.handle(press(Button::Joystick, 1000)).is_some());
        assert!(sm.handle(press(Button::A, 1010)).is_some());

        assert!(sm.state().green_led);
        assert!(!sm.state().pwm_enabled);
    }

    #[test]
    fn border_cycles_through_three_styles() {
        let mut sm = machine();

        let styles: Vec<BorderStyle> = [1000, 1300, 1600]
            .into_iter()
            .map(|t| sm.handle(press(Button::Joystick, t)).unwrap().state.border_style)
            .collect();

        assert_eq!(
            styles,
            [BorderStyle::Thin, BorderStyle::Thick, BorderStyle::None]
        );
        assert_eq!(BorderStyle::from_index(7), BorderStyle::Thin);
    }

    #[test]
    fn led_only_bindings_leave_border_alone() {
        let mut sm = ToggleStateMachine::new(Bindings::led_only(), Duration::from_millis(300));

        sm.handle(press(Button::Joystick, 0)).unwrap();

        assert!(sm.state().green_led);
        assert_eq!(sm.state().border_style, BorderStyle::None);
    }

    #[test]
    fn unbound_button_is_ignored() {
        let bindings = Bindings {
            button_a: Effects::NONE,
            ..Bindings::with_display()
        };
        let mut sm = ToggleStateMachine::new(bindings, Duration::from_millis(300));

        assert!(sm.handle(press(Button::A, 0)).is_none());
        assert_eq!(sm.state(), ToggleState::default());
    }

    #[test]
    fn stale_timestamp_is_rejected() {
        let mut sm = machine();

        sm.handle(press(Button::Joystick, 5000)).unwrap();
        assert!(sm.handle(press(Button::Joystick, 100)).is_none());
    }
}
