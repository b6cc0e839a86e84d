//! Per-pin interrupt entry points

use core::marker::PhantomData;

use domus_hal::InterruptVector;

use super::pin::{PinId, PIN_COUNT, RESERVED_PINS};
use super::slot::{dispatch, ChannelVector};
use crate::sync::IsrContext;

fn trampoline<S: ChannelVector, const PIN: u8>() {
    let _ = dispatch(S::slot(), PinId::new_unchecked(PIN), &IsrContext::new());
}

fn default_trampoline<S: ChannelVector>() {
    let _ = dispatch(S::slot(), PinId::INVALID, &IsrContext::new());
}

macro_rules! trampolines {
    ($s:ty; $($pin:literal),* $(,)?) => {
        [$(trampoline::<$s, $pin> as InterruptVector),*]
    };
}

/// Interrupt vectors indexed by pin
///
/// Built once at startup. Valid pins get their own trampoline; reserved
/// pins and anything past the bank get the default trampoline.
pub struct TrampolineTable<S> {
    vectors: [InterruptVector; PIN_COUNT],
    _slot: PhantomData<fn() -> S>,
}

impl<S: ChannelVector> Default for TrampolineTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ChannelVector> TrampolineTable<S> {
    /// Build the table for slot `S`
    pub fn new() -> Self {
        let mut vectors: [InterruptVector; PIN_COUNT] = trampolines![S;
            0, 1, 2, 3, 4, 5, 6, 7, 8, 9,
            10, 11, 12, 13, 14, 15, 16, 17, 18, 19,
            20, 21, 22, 23, 24, 25, 26, 27, 28, 29,
        ];
        for pin in RESERVED_PINS {
            vectors[pin as usize] = default_trampoline::<S>;
        }

        Self {
            vectors,
            _slot: PhantomData,
        }
    }

    /// Vector to attach for `pin`
    pub fn vector(&self, pin: PinId) -> InterruptVector {
        self.vectors
            .get(pin.index())
            .copied()
            .unwrap_or(default_trampoline::<S>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::slot::Dispatch;
    use std::sync::atomic::{AtomicUsize, Ordering};

    crate::channel_slot!(TableSlot);

    static CALLS: AtomicUsize = AtomicUsize::new(0);
    static INVALID_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn count(pin: PinId) {
        if pin == PinId::INVALID {
            INVALID_CALLS.fetch_add(1, Ordering::SeqCst);
        } else {
            CALLS.fetch_add(pin.index() + 1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_vectors_dispatch_their_own_pin() {
        let slot = TableSlot::slot();
        slot.maps.prime();
        {
            let mut maps = slot.maps.acquire();
            maps.handlers.insert(PinId::new_unchecked(5), count).unwrap();
            maps.handlers.insert(PinId::INVALID, count).unwrap();
        }

        let table = TrampolineTable::<TableSlot>::new();
        (table.vector(PinId::new_unchecked(5)))();
        assert_eq!(CALLS.load(Ordering::SeqCst), 6);

        // Unbound valid pin: nothing fires
        (table.vector(PinId::new_unchecked(6)))();
        assert_eq!(CALLS.load(Ordering::SeqCst), 6);

        // Reserved and out-of-bank pins go through the default trampoline
        (table.vector(PinId::new_unchecked(25)))();
        (table.vector(PinId::new_unchecked(200)))();
        assert_eq!(INVALID_CALLS.load(Ordering::SeqCst), 2);

        assert_eq!(
            dispatch(slot, PinId::new_unchecked(5), &IsrContext::new()),
            Dispatch::Fired
        );
    }
}
