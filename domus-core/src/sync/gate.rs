//! Binary gate
//!
//! A binary semaphore that owns the value it protects. Task code takes it
//! with [`BinaryGate::acquire`], which waits without a timeout. Interrupt
//! code takes it with [`BinaryGate::acquire_isr`], which makes a single
//! attempt and never waits. The interrupt entry point requires an
//! [`IsrContext`], which only the interrupt trampolines of this crate can
//! create, so task code cannot reach it by accident.
//!
//! Both entry points return a guard; dropping the guard is the only way to
//! give the gate back.
//!
//! A new gate starts *not given*: nothing can acquire it until
//! [`BinaryGate::prime`] has been called once.
//!
//! ```text
//!  NOT_GIVEN ──prime──▶ AVAILABLE ◀──drop guard── HELD
//!                           └──────acquire─────────▶┘
//! ```

use core::cell::UnsafeCell;
use core::hint::spin_loop;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use portable_atomic::{AtomicU8, Ordering};

const NOT_GIVEN: u8 = 0;
const AVAILABLE: u8 = 1;
const HELD: u8 = 2;

/// Proof that the caller runs in interrupt context
///
/// Minted only by the interrupt trampolines.
#[derive(Debug)]
pub struct IsrContext {
    _private: (),
}

impl IsrContext {
    pub(crate) const fn new() -> Self {
        Self { _private: () }
    }
}

/// Guard marker for task-context acquisition
#[derive(Debug)]
pub enum Task {}

/// Guard marker for interrupt-context acquisition
#[derive(Debug)]
pub enum Isr {}

/// Mutual exclusion usable from both task and interrupt context
pub struct BinaryGate<T> {
    state: AtomicU8,
    value: UnsafeCell<T>,
}

// SAFETY: the value is only reachable through a guard, and a guard only
// exists while `state` is HELD. The HELD transition is a single
// compare-exchange, so at most one guard exists at any instant, whichever
// context took it. `T: Send` because the holder may be a different thread
// or interrupt than the creator.
unsafe impl<T: Send> Sync for BinaryGate<T> {}

impl<T> BinaryGate<T> {
    /// Create a gate around `value`, in the not-yet-given state
    pub const fn new(value: T) -> Self {
        Self {
            state: AtomicU8::new(NOT_GIVEN),
            value: UnsafeCell::new(value),
        }
    }

    /// Give the gate for the first time
    ///
    /// Has no effect on a gate that is already available or held.
    pub fn prime(&self) {
        let _ = self
            .state
            .compare_exchange(NOT_GIVEN, AVAILABLE, Ordering::Release, Ordering::Relaxed);
    }

    /// Whether [`BinaryGate::prime`] has been called
    pub fn is_primed(&self) -> bool {
        self.state.load(Ordering::Relaxed) != NOT_GIVEN
    }

    /// Whether a guard currently exists
    pub fn is_held(&self) -> bool {
        self.state.load(Ordering::Relaxed) == HELD
    }

    /// Take the gate from task context, waiting as long as it takes
    ///
    /// Never returns on a gate that was not primed.
    pub fn acquire(&self) -> TaskGuard<'_, T> {
        loop {
            if let Some(guard) = self.try_acquire() {
                return guard;
            }
            spin_loop();
        }
    }

    /// Take the gate from task context if it is free right now
    pub fn try_acquire(&self) -> Option<TaskGuard<'_, T>> {
        self.take().then(|| GateGuard::new(self))
    }

    /// Take the gate from interrupt context
    ///
    /// Makes one attempt; returns `None` if the gate is held.
    pub fn acquire_isr(&self, _cx: &IsrContext) -> Option<IsrGuard<'_, T>> {
        self.take().then(|| GateGuard::new(self))
    }

    /// Access the value through an exclusive borrow, no locking needed
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    fn take(&self) -> bool {
        self.state
            .compare_exchange(AVAILABLE, HELD, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    fn give(&self) {
        self.state.store(AVAILABLE, Ordering::Release);
    }
}

/// Scoped ownership of a [`BinaryGate`]
///
/// `C` records the context it was taken from. The gate is given back when
/// the guard is dropped.
pub struct GateGuard<'a, T, C> {
    gate: &'a BinaryGate<T>,
    _context: PhantomData<C>,
}

/// Guard taken from task context
pub type TaskGuard<'a, T> = GateGuard<'a, T, Task>;

/// Guard taken from interrupt context
pub type IsrGuard<'a, T> = GateGuard<'a, T, Isr>;

impl<'a, T, C> GateGuard<'a, T, C> {
    fn new(gate: &'a BinaryGate<T>) -> Self {
        Self {
            gate,
            _context: PhantomData,
        }
    }
}

impl<T, C> Deref for GateGuard<'_, T, C> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard exists only while the gate is HELD by it.
        unsafe { &*self.gate.value.get() }
    }
}

impl<T, C> DerefMut for GateGuard<'_, T, C> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard exists only while the gate is HELD by it, and
        // `&mut self` rules out a second borrow through the same guard.
        unsafe { &mut *self.gate.value.get() }
    }
}

impl<T, C> Drop for GateGuard<'_, T, C> {
    fn drop(&mut self) {
        self.gate.give();
    }
}
