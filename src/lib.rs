#![cfg_attr(not(test), no_std)]

pub mod constants;
pub mod control;
pub mod display;
pub mod input;
pub mod joystick;
pub mod mapping;
pub mod pwm_controller;
pub mod status;
pub mod toggle;
pub mod usb_serial;

#[cfg(feature = "firmware")]
pub mod board;
