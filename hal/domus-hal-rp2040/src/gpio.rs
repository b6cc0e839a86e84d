//! GPIO driver for RP2040
//!
//! Pins are configured as embassy `Flex` pins. Attaching an interrupt moves
//! the pin into an edge watcher task spawned on an interrupt executor; the
//! watcher calls the vector from that executor's interrupt on every matching
//! edge. Detaching signals the watcher to stop and hand the pin back.
//!
//! Watchers run at interrupt priority, so a stop signalled from thread mode
//! completes before the signalling call returns. A pin whose watcher has
//! not stopped yet is reported as unavailable and retried on the next call.

use core::mem;

use domus_hal::{Edge, GpioDriver, InterruptVector, PinMode};
use embassy_executor::SendSpawner;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Flex, Pull};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::pins::{PinBank, BANK_SIZE};

/// Stop request per pin, raised by the driver
static STOP: [Signal<CriticalSectionRawMutex, ()>; BANK_SIZE] =
    [const { Signal::new() }; BANK_SIZE];

/// Pin handed back by a stopped watcher
static RETURNED: [Signal<CriticalSectionRawMutex, Flex<'static>>; BANK_SIZE] =
    [const { Signal::new() }; BANK_SIZE];

/// Ownership state of one GPIO
enum PinState {
    /// Still in the bank
    Free,
    /// Configured and owned by the driver
    Ready(Flex<'static>),
    /// Moved into an edge watcher
    Watching,
    /// Watcher asked to stop, pin not handed back yet
    Stopping,
}

/// Watch one pin for edges and call `vector` on each
#[embassy_executor::task(pool_size = 30)]
async fn edge_watcher(pin: u8, mut flex: Flex<'static>, vector: InterruptVector, edge: Edge) {
    let stop = &STOP[pin as usize];
    loop {
        let event = match edge {
            Edge::Rising => select(flex.wait_for_rising_edge(), stop.wait()).await,
            Edge::Falling => select(flex.wait_for_falling_edge(), stop.wait()).await,
        };
        match event {
            Either::First(()) => vector(),
            Either::Second(()) => break,
        }
    }
    RETURNED[pin as usize].signal(flex);
}

/// RP2040 implementation of [`GpioDriver`]
pub struct Rp2040Gpio {
    bank: PinBank,
    pins: [PinState; BANK_SIZE],
    spawner: SendSpawner,
}

impl Rp2040Gpio {
    /// Create a driver over `bank`, spawning watchers on `spawner`
    ///
    /// `spawner` should belong to an `InterruptExecutor` so handlers run in
    /// interrupt context.
    pub fn new(bank: PinBank, spawner: SendSpawner) -> Self {
        Self {
            bank,
            pins: [const { PinState::Free }; BANK_SIZE],
            spawner,
        }
    }

    /// Whether an edge watcher currently owns `pin`
    pub fn is_watching(&self, pin: u8) -> bool {
        matches!(self.pins.get(pin as usize), Some(PinState::Watching))
    }

    /// Get the pin back into driver ownership, stopping its watcher
    fn reclaim(&mut self, pin: u8) -> Option<Flex<'static>> {
        let index = pin as usize;
        let state = mem::replace(self.pins.get_mut(index)?, PinState::Free);
        match state {
            PinState::Ready(flex) => Some(flex),
            PinState::Free => self.bank.take(pin).map(Flex::new),
            PinState::Watching => {
                STOP[index].signal(());
                self.take_returned(pin)
            }
            PinState::Stopping => self.take_returned(pin),
        }
    }

    fn take_returned(&mut self, pin: u8) -> Option<Flex<'static>> {
        let index = pin as usize;
        let flex = RETURNED[index].try_take();
        if flex.is_none() {
            warn!("pin {} watcher still running", pin);
            self.pins[index] = PinState::Stopping;
        }
        flex
    }
}

impl GpioDriver for Rp2040Gpio {
    fn configure(&mut self, pin: u8, mode: PinMode) {
        let Some(mut flex) = self.reclaim(pin) else {
            warn!("pin {} unavailable, not configured", pin);
            return;
        };

        match mode {
            PinMode::Input => {
                flex.set_pull(Pull::None);
                flex.set_as_input();
            }
            PinMode::InputPullUp => {
                flex.set_pull(Pull::Up);
                flex.set_as_input();
            }
            PinMode::InputPullDown => {
                flex.set_pull(Pull::Down);
                flex.set_as_input();
            }
            PinMode::Output => {
                flex.set_pull(Pull::None);
                flex.set_as_output();
            }
            PinMode::OutputOpenDrain => {
                // Released (high-Z) until driven low
                flex.set_low();
                flex.set_pull(Pull::None);
                flex.set_as_input();
            }
        }

        self.pins[pin as usize] = PinState::Ready(flex);
    }

    fn attach_interrupt(&mut self, pin: u8, vector: InterruptVector, edge: Edge) {
        let Some(flex) = self.reclaim(pin) else {
            warn!("pin {} unavailable, interrupt not attached", pin);
            return;
        };

        STOP[pin as usize].reset();
        match self.spawner.spawn(edge_watcher(pin, flex, vector, edge)) {
            Ok(()) => {
                info!("pin {} interrupt attached", pin);
                self.pins[pin as usize] = PinState::Watching;
            }
            Err(_) => warn!("pin {} lost, no edge watcher slot", pin),
        }
    }

    fn detach_interrupt(&mut self, pin: u8) {
        if !matches!(
            self.pins.get(pin as usize),
            Some(PinState::Watching | PinState::Stopping)
        ) {
            return;
        }

        if let Some(flex) = self.reclaim(pin) {
            self.pins[pin as usize] = PinState::Ready(flex);
        }
    }
}
