//! Synchronization primitives shared by task and interrupt context

#[allow(unsafe_code)]
mod gate;

pub use gate::{BinaryGate, GateGuard, Isr, IsrContext, IsrGuard, Task, TaskGuard};
