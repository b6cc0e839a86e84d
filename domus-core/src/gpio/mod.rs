//! GPIO channel registry
//!
//! Maps physical pins to logical channels (mode, polarity, optional
//! interrupt handler) and routes hardware edge interrupts to the handler
//! bound to the pin that fired.
//!
//! # Interrupt path
//!
//! ```text
//!  hardware edge on pin N
//!        │
//!        ▼
//!  trampoline::<S, N>()        one plain fn per pin, from TrampolineTable
//!        │
//!        ▼
//!  dispatch(S::slot(), N)      acquire_isr → lookup → handler(N) → release
//! ```
//!
//! The platform interrupt API takes a bare `fn()` with no context, so each
//! pin needs its own entry point; they all forward into one dispatcher.

pub mod pin;
pub mod registry;
pub mod slot;
pub mod trampoline;

pub use domus_hal::{Edge, PinMode};
pub use pin::{validate_pin, PinError, PinId, PIN_COUNT, RESERVED_PINS};
pub use registry::{Channel, ChannelRegistry};
pub use slot::{dispatch, ChannelSlot, ChannelVector, Dispatch, InterruptHandler};
pub use trampoline::TrampolineTable;
