//! Shared channel state and the interrupt dispatcher
//!
//! The pin→channel and pin→handler maps live in a `'static` [`ChannelSlot`]
//! because the interrupt trampolines have no other way to reach them. Both
//! maps sit behind one [`BinaryGate`]; nothing else guards them.

use heapless::LinearMap;
use portable_atomic::{AtomicBool, Ordering};

use super::pin::{PinId, PIN_COUNT};
use super::registry::Channel;
use crate::sync::{BinaryGate, IsrContext};

/// Handler invoked in interrupt context with the pin that fired
///
/// Runs while the registry gate is held: it must not call back into the
/// registry.
pub type InterruptHandler = fn(PinId);

pub(crate) struct ChannelMaps {
    pub(crate) channels: LinearMap<PinId, Channel, PIN_COUNT>,
    pub(crate) handlers: LinearMap<PinId, InterruptHandler, PIN_COUNT>,
}

impl ChannelMaps {
    const fn new() -> Self {
        Self {
            channels: LinearMap::new(),
            handlers: LinearMap::new(),
        }
    }
}

/// Statically allocated registry state
///
/// Declare one per board with [`channel_slot!`](crate::channel_slot).
pub struct ChannelSlot {
    pub(crate) maps: BinaryGate<ChannelMaps>,
    claimed: AtomicBool,
}

impl Default for ChannelSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelSlot {
    /// Create empty state; the gate is primed when a registry claims it
    pub const fn new() -> Self {
        Self {
            maps: BinaryGate::new(ChannelMaps::new()),
            claimed: AtomicBool::new(false),
        }
    }

    /// Mark the slot as owned by a registry
    ///
    /// Returns false if it was already claimed.
    pub(crate) fn claim(&self) -> bool {
        !self.claimed.swap(true, Ordering::AcqRel)
    }
}

/// Type-level handle to a `'static` [`ChannelSlot`]
///
/// Trampolines are monomorphised over the implementing type, which is how
/// a context-free `fn()` finds its registry.
pub trait ChannelVector: 'static {
    /// The slot this vector dispatches into
    fn slot() -> &'static ChannelSlot;
}

/// Declare a [`ChannelVector`] type backed by its own static slot
///
/// ```ignore
/// domus_core::channel_slot!(pub BoardChannels);
/// let registry = ChannelRegistry::<BoardChannels, _>::take(gpio).unwrap();
/// ```
#[macro_export]
macro_rules! channel_slot {
    ($vis:vis $name:ident) => {
        $vis struct $name;

        impl $crate::gpio::ChannelVector for $name {
            fn slot() -> &'static $crate::gpio::ChannelSlot {
                static SLOT: $crate::gpio::ChannelSlot = $crate::gpio::ChannelSlot::new();
                &SLOT
            }
        }
    };
}

/// What an interrupt dispatch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Dispatch {
    /// The bound handler ran
    Fired,
    /// No handler is bound to the pin
    Unbound,
    /// Task code held the gate; the event was dropped
    Busy,
}

/// Route an interrupt on `pin` to its bound handler
///
/// Takes the gate through the interrupt entry point, so it never waits.
pub fn dispatch(slot: &ChannelSlot, pin: PinId, cx: &IsrContext) -> Dispatch {
    let Some(maps) = slot.maps.acquire_isr(cx) else {
        return Dispatch::Busy;
    };

    match maps.handlers.get(&pin) {
        Some(handler) => {
            handler(pin);
            Dispatch::Fired
        }
        None => Dispatch::Unbound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU8, Ordering as StdOrdering};

    static LAST_PIN: AtomicU8 = AtomicU8::new(0);

    fn record(pin: PinId) {
        LAST_PIN.store(pin.get(), StdOrdering::SeqCst);
    }

    fn primed_slot() -> ChannelSlot {
        let slot = ChannelSlot::new();
        slot.maps.prime();
        slot
    }

    #[test]
    fn test_dispatch_bound_handler() {
        let slot = primed_slot();
        let pin = PinId::new_unchecked(7);
        slot.maps.acquire().handlers.insert(pin, record).unwrap();

        assert_eq!(dispatch(&slot, pin, &IsrContext::new()), Dispatch::Fired);
        assert_eq!(LAST_PIN.load(StdOrdering::SeqCst), 7);
        assert!(!slot.maps.is_held());
    }

    #[test]
    fn test_dispatch_unbound_and_invalid() {
        let slot = primed_slot();
        let cx = IsrContext::new();
        assert_eq!(dispatch(&slot, PinId::new_unchecked(3), &cx), Dispatch::Unbound);
        assert_eq!(dispatch(&slot, PinId::INVALID, &cx), Dispatch::Unbound);
    }

    #[test]
    fn test_dispatch_while_task_holds_gate() {
        let slot = primed_slot();
        let pin = PinId::new_unchecked(2);
        slot.maps.acquire().handlers.insert(pin, record).unwrap();

        let _held = slot.maps.acquire();
        assert_eq!(dispatch(&slot, pin, &IsrContext::new()), Dispatch::Busy);
    }

    #[test]
    fn test_slot_claimed_once() {
        let slot = ChannelSlot::new();
        assert!(slot.claim());
        assert!(!slot.claim());
    }
}
