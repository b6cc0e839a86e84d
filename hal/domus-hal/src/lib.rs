//! Domus Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits that chip-specific
//! HALs implement (RP2040 today). Everything above it, the channel registry
//! and the persistent image store in `domus-core`, is written against these
//! traits only and runs unchanged on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  domus-core (registry, image store)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  domus-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  domus-hal-   │       │  mock (host)  │
//! │    rp2040     │       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioDriver`] - Pin mode configuration and edge interrupts
//! - [`eeprom::Eeprom`] - Byte-addressed non-volatile storage

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod eeprom;
pub mod gpio;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export key traits at crate root for convenience
pub use eeprom::{Eeprom, EepromError};
pub use gpio::{Edge, GpioDriver, InterruptVector, PinMode};
