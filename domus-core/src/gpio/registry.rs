//! Channel registry
//!
//! Owns the GPIO driver and is the only writer of the shared channel maps.
//! Pins must come from [`validate_pin`](super::validate_pin); nothing here
//! re-checks them.

use core::marker::PhantomData;

use domus_hal::{Edge, GpioDriver, PinMode};
use heapless::Vec;

use super::pin::{PinId, PIN_COUNT};
use super::slot::{ChannelVector, InterruptHandler};
use super::trampoline::TrampolineTable;

/// Logical configuration of one registered pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    /// Pin the channel is bound to
    pub pin: PinId,
    /// Electrical mode the pin was set to
    pub mode: PinMode,
    /// Pin is active-low
    pub inverted: bool,
    /// Edge the hardware interrupt is attached to, if any
    pub interrupt: Option<Edge>,
}

/// Registry of logical channels for slot `S`, driving hardware `D`
pub struct ChannelRegistry<S: ChannelVector, D: GpioDriver> {
    driver: D,
    trampolines: TrampolineTable<S>,
    _slot: PhantomData<fn() -> S>,
}

impl<S: ChannelVector, D: GpioDriver> ChannelRegistry<S, D> {
    /// Claim slot `S` and start managing `driver`
    ///
    /// Primes the slot's gate and builds the trampoline table. Returns
    /// `None` if a registry already claimed the slot.
    pub fn take(driver: D) -> Option<Self> {
        let slot = S::slot();
        if !slot.claim() {
            return None;
        }
        slot.maps.prime();

        Some(Self {
            driver,
            trampolines: TrampolineTable::new(),
            _slot: PhantomData,
        })
    }

    /// Configure `pin` and bind its interrupt handler
    ///
    /// Replaces any channel already registered on the pin. The hardware
    /// interrupt is attached, on the rising edge (or falling edge when
    /// `inverted`), when the mode is an input mode and a handler is given;
    /// otherwise any interrupt left from a previous setup is detached.
    pub fn setup_channel(
        &mut self,
        pin: PinId,
        mode: PinMode,
        inverted: bool,
        handler: Option<InterruptHandler>,
    ) {
        debug!(
            "setup channel: pin={} mode={} inverted={} handler={}",
            pin.get(),
            mode,
            inverted,
            handler.is_some()
        );

        self.driver.configure(pin.get(), mode);

        let handler = handler.filter(|_| mode.is_input());
        let interrupt = handler.map(|_| Edge::active(inverted));
        let channel = Channel {
            pin,
            mode,
            inverted,
            interrupt,
        };

        {
            let mut maps = S::slot().maps.acquire();

            let previous = match maps.channels.insert(pin, channel) {
                Ok(previous) => previous,
                Err(_) => {
                    warn!("channel map full, pin {} not registered", pin.get());
                    return;
                }
            };

            match handler {
                Some(handler) => {
                    if maps.handlers.insert(pin, handler).is_err() {
                        warn!("handler map full, pin {} not bound", pin.get());
                    }
                }
                None => {
                    if previous.and_then(|c| c.interrupt).is_some() {
                        self.driver.detach_interrupt(pin.get());
                    }
                    let _ = maps.handlers.remove(&pin);
                }
            }
        }

        // Attached after the handler is bound so the first edge finds it
        if let Some(edge) = interrupt {
            self.driver
                .attach_interrupt(pin.get(), self.trampolines.vector(pin), edge);
        }
    }

    /// Release `pin`
    ///
    /// Returns the pin to input with pull-up, detaches its interrupt and
    /// unbinds its handler under a single gate acquisition, then forgets
    /// the channel. Returns false, touching nothing, if the pin has no
    /// channel.
    pub fn cleanup_channel(&mut self, pin: PinId) -> bool {
        let mut maps = S::slot().maps.acquire();

        let Some(channel) = maps.channels.get(&pin).copied() else {
            return false;
        };

        debug!("cleanup channel: pin={}", pin.get());

        self.driver.configure(pin.get(), PinMode::InputPullUp);
        if channel.interrupt.is_some() {
            self.driver.detach_interrupt(pin.get());
        }
        let _ = maps.handlers.remove(&pin);
        let _ = maps.channels.remove(&pin);

        true
    }

    /// Snapshot of every registered pin, in ascending order
    ///
    /// Holds the gate while copying, see [`ChannelRegistry::channel`].
    pub fn enumerate_channels(&self) -> Vec<PinId, PIN_COUNT> {
        let mut pins: Vec<PinId, PIN_COUNT> = {
            let maps = S::slot().maps.acquire();
            maps.channels.keys().copied().collect()
        };
        pins.sort_unstable();
        pins
    }

    /// Snapshot of the channel on `pin`
    ///
    /// Takes the gate like every accessor here; interrupts arriving while
    /// it is held are dropped as [`Dispatch::Busy`](super::Dispatch::Busy),
    /// so keep these calls off hot paths.
    pub fn channel(&self, pin: PinId) -> Option<Channel> {
        S::slot().maps.acquire().channels.get(&pin).copied()
    }

    /// Handler currently bound to `pin`
    ///
    /// Holds the gate for the lookup, see [`ChannelRegistry::channel`].
    pub fn handler(&self, pin: PinId) -> Option<InterruptHandler> {
        S::slot().maps.acquire().handlers.get(&pin).copied()
    }

    /// Number of registered channels
    ///
    /// Holds the gate for the count, see [`ChannelRegistry::channel`].
    pub fn len(&self) -> usize {
        S::slot().maps.acquire().channels.len()
    }

    /// Whether no channel is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The managed driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::validate_pin;
    use domus_hal::mock::MockGpio;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;

    fn pin(raw: i32) -> PinId {
        validate_pin(raw).unwrap()
    }

    mod claim {
        use super::*;
        crate::channel_slot!(Slot);

        #[test]
        fn test_slot_claimed_once() {
            let first = ChannelRegistry::<Slot, _>::take(MockGpio::new());
            assert!(first.is_some());
            assert!(ChannelRegistry::<Slot, _>::take(MockGpio::new()).is_none());
        }
    }

    mod setup {
        use super::*;
        crate::channel_slot!(Slot);

        static FIRST: AtomicUsize = AtomicUsize::new(0);
        static SECOND: AtomicUsize = AtomicUsize::new(0);

        fn first(_: PinId) {
            FIRST.fetch_add(1, Ordering::SeqCst);
        }

        fn second(_: PinId) {
            SECOND.fetch_add(1, Ordering::SeqCst);
        }

        #[test]
        fn test_setup_replace_and_cleanup() {
            let mut registry = ChannelRegistry::<Slot, _>::take(MockGpio::new()).unwrap();
            let sensor = pin(4);

            // Edge polarity follows inversion
            registry.setup_channel(sensor, PinMode::Input, false, Some(first));
            assert_eq!(registry.driver().mode(4), Some(PinMode::Input));
            assert_eq!(
                registry.driver().attachment(4).map(|a| a.edge),
                Some(Edge::Rising)
            );
            assert!(registry.driver().fire(4));
            assert_eq!(FIRST.load(Ordering::SeqCst), 1);

            // Second setup replaces channel and handler entirely
            registry.setup_channel(sensor, PinMode::InputPullUp, true, Some(second));
            assert_eq!(registry.len(), 1);
            assert_eq!(
                registry.channel(sensor),
                Some(Channel {
                    pin: sensor,
                    mode: PinMode::InputPullUp,
                    inverted: true,
                    interrupt: Some(Edge::Falling),
                })
            );
            assert!(registry.driver().fire(4));
            assert_eq!(FIRST.load(Ordering::SeqCst), 1);
            assert_eq!(SECOND.load(Ordering::SeqCst), 1);
            assert_eq!(registry.driver().attached_count(), 1);

            // Cleanup: pull-up, detached, unbound, forgotten
            assert!(registry.cleanup_channel(sensor));
            assert_eq!(registry.driver().mode(4), Some(PinMode::InputPullUp));
            assert!(registry.driver().attachment(4).is_none());
            assert!(registry.handler(sensor).is_none());
            assert!(registry.channel(sensor).is_none());
            assert!(registry.is_empty());
        }
    }

    mod outputs {
        use super::*;
        crate::channel_slot!(Slot);

        static PRESSED: AtomicUsize = AtomicUsize::new(0);

        fn pressed(_: PinId) {
            PRESSED.fetch_add(1, Ordering::SeqCst);
        }

        #[test]
        fn test_handler_only_on_input_modes() {
            let mut registry = ChannelRegistry::<Slot, _>::take(MockGpio::new()).unwrap();
            let relay = pin(10);

            registry.setup_channel(relay, PinMode::Input, false, Some(pressed));
            assert!(registry.driver().attachment(10).is_some());

            registry.setup_channel(relay, PinMode::Output, false, Some(pressed));
            assert_eq!(registry.driver().mode(10), Some(PinMode::Output));
            assert!(registry.driver().attachment(10).is_none());
            assert!(registry.handler(relay).is_none());
            assert_eq!(registry.channel(relay).and_then(|c| c.interrupt), None);
        }

        #[test]
        fn test_setup_without_handler_detaches_previous() {
            let mut registry = ChannelRegistry::<Slot2, _>::take(MockGpio::new()).unwrap();
            let button = pin(11);

            registry.setup_channel(button, PinMode::Input, false, Some(pressed));
            assert!(registry.driver().fire(11));
            assert_eq!(PRESSED.load(Ordering::SeqCst), 1);

            registry.setup_channel(button, PinMode::Input, false, None);
            assert!(registry.driver().attachment(11).is_none());
            assert!(!registry.driver().fire(11));
            assert!(registry.handler(button).is_none());
            assert_eq!(registry.len(), 1);
        }

        crate::channel_slot!(Slot2);
    }

    mod noop {
        use super::*;
        crate::channel_slot!(Slot);

        #[test]
        fn test_cleanup_unknown_pin_is_noop() {
            let mut registry = ChannelRegistry::<Slot, _>::take(MockGpio::new()).unwrap();
            registry.setup_channel(pin(2), PinMode::Output, false, None);

            assert!(!registry.cleanup_channel(pin(3)));
            assert_eq!(registry.driver().mode(3), None);
            assert_eq!(registry.driver().detach_calls(), 0);
            assert_eq!(registry.enumerate_channels().as_slice(), &[pin(2)]);
        }

        #[test]
        fn test_enumerate_sorted() {
            let mut registry = ChannelRegistry::<Slot2, _>::take(MockGpio::new()).unwrap();
            for raw in [17, 3, 9] {
                registry.setup_channel(pin(raw), PinMode::Output, false, None);
            }
            assert_eq!(
                registry.enumerate_channels().as_slice(),
                &[pin(3), pin(9), pin(17)]
            );
        }

        crate::channel_slot!(Slot2);
    }

    mod concurrent {
        use super::*;
        crate::channel_slot!(Slot);

        static IN_HANDLER: AtomicBool = AtomicBool::new(false);
        static FIRED: AtomicUsize = AtomicUsize::new(0);

        fn handler(pin: PinId) {
            assert_eq!(pin.get(), 6);
            IN_HANDLER.store(true, Ordering::SeqCst);
            FIRED.fetch_add(1, Ordering::SeqCst);
            IN_HANDLER.store(false, Ordering::SeqCst);
        }

        #[test]
        fn test_dispatch_racing_cleanup() {
            let mut registry = ChannelRegistry::<Slot, _>::take(MockGpio::new()).unwrap();
            let sensor = pin(6);
            registry.setup_channel(sensor, PinMode::Input, false, Some(handler));
            let vector = registry.driver().vector(6).unwrap();
            let stop = AtomicBool::new(false);

            thread::scope(|s| {
                // Simulated interrupt source, keeps firing the captured vector
                s.spawn(|| {
                    while !stop.load(Ordering::SeqCst) {
                        vector();
                    }
                });

                for _ in 0..1_000 {
                    registry.setup_channel(sensor, PinMode::Input, false, Some(handler));
                    assert!(registry.cleanup_channel(sensor));
                    // A dispatch that already took the gate finished before cleanup could
                    assert!(!IN_HANDLER.load(Ordering::SeqCst));
                }
                stop.store(true, Ordering::SeqCst);
            });

            // After cleanup returns no later dispatch can find the handler
            let fired = FIRED.load(Ordering::SeqCst);
            for _ in 0..100 {
                vector();
            }
            assert_eq!(FIRED.load(Ordering::SeqCst), fired);
            assert!(registry.is_empty());
        }
    }

    mod replace_race {
        use super::*;
        use crate::gpio::{dispatch, Dispatch};
        use crate::sync::IsrContext;
        crate::channel_slot!(Slot);

        static PREVIOUS: AtomicUsize = AtomicUsize::new(0);
        static NEXT: AtomicUsize = AtomicUsize::new(0);

        fn previous(_: PinId) {
            PREVIOUS.fetch_add(1, Ordering::SeqCst);
        }

        fn next(_: PinId) {
            NEXT.fetch_add(1, Ordering::SeqCst);
        }

        fn total() -> usize {
            PREVIOUS.load(Ordering::SeqCst) + NEXT.load(Ordering::SeqCst)
        }

        #[test]
        fn test_dispatch_racing_setup_fires_exactly_one_handler() {
            let mut registry = ChannelRegistry::<Slot, _>::take(MockGpio::new()).unwrap();
            let sensor = pin(8);
            registry.setup_channel(sensor, PinMode::Input, false, Some(previous));
            let stop = AtomicBool::new(false);

            let (fired, unbound) = thread::scope(|s| {
                // Simulated interrupt context dispatching on the same pin
                let isr = s.spawn(|| {
                    let cx = IsrContext::new();
                    let (mut fired, mut unbound) = (0usize, 0usize);
                    while !stop.load(Ordering::SeqCst) || fired == 0 {
                        let before = total();
                        match dispatch(Slot::slot(), sensor, &cx) {
                            Dispatch::Fired => {
                                fired += 1;
                                assert_eq!(total(), before + 1);
                            }
                            Dispatch::Unbound => unbound += 1,
                            Dispatch::Busy => {}
                        }
                    }
                    (fired, unbound)
                });

                for i in 0..1_000 {
                    let handler: InterruptHandler = if i % 2 == 0 { next } else { previous };
                    registry.setup_channel(sensor, PinMode::Input, false, Some(handler));
                }
                stop.store(true, Ordering::SeqCst);
                isr.join().unwrap()
            });

            // Replacing a handler never leaves the pin unbound in between
            assert_eq!(unbound, 0);
            assert_eq!(total(), fired);
            assert_eq!(registry.len(), 1);
        }
    }
}
