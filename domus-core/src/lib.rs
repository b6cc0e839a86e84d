//! Board-agnostic core for the Domus home automation controller
//!
//! Every hardware-control subsystem on the controller (shower guard,
//! keybox, RFID lock, proportional valve) builds on the pieces in this
//! crate:
//!
//! - [`sync`] - the binary gate shared by task and interrupt context
//! - [`gpio`] - pin validation, the channel registry and interrupt dispatch
//! - [`storage`] - the versioned block image persisted to EEPROM, and diffing
//! - [`config`] - typed subsystem configuration blocks and boot reconciliation

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod log;

pub mod config;
pub mod gpio;
pub mod storage;
pub mod sync;
