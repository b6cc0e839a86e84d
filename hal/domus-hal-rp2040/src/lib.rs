//! RP2040-specific HAL for the home automation controller
//!
//! This crate provides RP2040 implementations of the shared `domus-hal`
//! traits:
//!
//! - GPIO allocation by pin number
//! - Pin configuration and edge interrupts (implements `domus_hal::GpioDriver`)
//! - Emulated EEPROM in the last flash sector (implements `domus_hal::Eeprom`)

#![no_std]

#[macro_use]
mod log;

pub mod eeprom;
pub mod gpio;
pub mod pins;

pub use eeprom::FlashEeprom;
pub use gpio::Rp2040Gpio;
pub use pins::{PinBank, PinBankPeripherals};
