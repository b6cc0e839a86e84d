//! GPIO abstractions
//!
//! Pin mode configuration and edge interrupt attachment. The interrupt API
//! mirrors what small MCU platforms offer: one plain function per hardware
//! vector, with no context pointer or closure passed to the handler.

/// Electrical function of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input
    Input,
    /// Input with internal pull-up (safe idle state)
    InputPullUp,
    /// Input with internal pull-down
    InputPullDown,
    /// Push-pull output
    Output,
    /// Open-drain output
    OutputOpenDrain,
}

impl PinMode {
    /// Whether the pin can sense levels (and so raise edge interrupts)
    pub const fn is_input(self) -> bool {
        matches!(
            self,
            PinMode::Input | PinMode::InputPullUp | PinMode::InputPullDown
        )
    }
}

/// Signal edge that raises an interrupt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low to high transition
    Rising,
    /// High to low transition
    Falling,
}

impl Edge {
    /// Edge that signals "active" for a pin with the given polarity
    ///
    /// Active-high pins fire on the rising edge, inverted (active-low)
    /// pins on the falling edge.
    pub const fn active(inverted: bool) -> Self {
        if inverted {
            Edge::Falling
        } else {
            Edge::Rising
        }
    }
}

/// Hardware interrupt entry point
///
/// Called from interrupt context with no arguments; one distinct function
/// per attached pin.
pub type InterruptVector = fn();

/// GPIO controller
///
/// Pins are addressed by their raw number. Callers are responsible for
/// only passing pins that are valid for the board.
pub trait GpioDriver {
    /// Set the electrical mode of a pin
    ///
    /// Detaches any interrupt vector attached to the pin; callers that want
    /// edges after reconfiguring attach again.
    fn configure(&mut self, pin: u8, mode: PinMode);

    /// Attach an interrupt vector to a pin edge
    ///
    /// Replaces any vector already attached to the pin.
    fn attach_interrupt(&mut self, pin: u8, vector: InterruptVector, edge: Edge);

    /// Detach the interrupt vector from a pin
    ///
    /// Does nothing if no vector is attached.
    fn detach_interrupt(&mut self, pin: u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_modes() {
        assert!(PinMode::Input.is_input());
        assert!(PinMode::InputPullUp.is_input());
        assert!(PinMode::InputPullDown.is_input());
        assert!(!PinMode::Output.is_input());
        assert!(!PinMode::OutputOpenDrain.is_input());
    }

    #[test]
    fn test_active_edge() {
        assert_eq!(Edge::active(false), Edge::Rising);
        assert_eq!(Edge::active(true), Edge::Falling);
    }
}
