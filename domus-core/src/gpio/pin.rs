//! Pin identifiers and validation
//!
//! The valid set covers the RP2040 user GPIOs. Pins wired to board
//! functions are excluded:
//!
//! | Pin | Function |
//! |-----|----------|
//! | 23  | SMPS power-save select |
//! | 24  | VBUS sense |
//! | 25  | Onboard status LED |
//! | 29  | VSYS sense (ADC3) |

/// Number of GPIOs in the bank (0-29)
pub const PIN_COUNT: usize = 30;

/// Pins that exist but must never be configured by a subsystem
pub const RESERVED_PINS: [u8; 4] = [23, 24, 25, 29];

/// A pin number that passed [`validate_pin`]
///
/// Every `PinId` outside this module is valid for the board, except the
/// crate-internal [`PinId::INVALID`] sentinel used by the default
/// trampoline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinId(u8);

impl PinId {
    /// Key under which interrupts from unmapped vectors are dispatched
    ///
    /// No channel can ever be registered under it.
    pub const INVALID: PinId = PinId(u8::MAX);

    pub(crate) const fn new_unchecked(pin: u8) -> Self {
        PinId(pin)
    }

    /// Raw pin number
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Pin number as an index into per-pin tables
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reasons a raw pin number is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// No such GPIO on this chip
    OutOfRange(i32),
    /// GPIO wired to a board function
    Reserved(u8),
}

/// Check a raw pin number from configuration
///
/// This is the only way to obtain a [`PinId`]; every path that configures
/// a pin must go through it.
pub fn validate_pin(raw: i32) -> Result<PinId, PinError> {
    let pin = match u8::try_from(raw) {
        Ok(pin) if (pin as usize) < PIN_COUNT => pin,
        _ => return Err(PinError::OutOfRange(raw)),
    };

    if RESERVED_PINS.contains(&pin) {
        return Err(PinError::Reserved(pin));
    }

    Ok(PinId(pin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_pins() {
        assert_eq!(validate_pin(0), Ok(PinId(0)));
        assert_eq!(validate_pin(22), Ok(PinId(22)));
        assert_eq!(validate_pin(28).map(PinId::get), Ok(28));
    }

    #[test]
    fn test_reserved_pins() {
        for pin in RESERVED_PINS {
            assert_eq!(validate_pin(pin as i32), Err(PinError::Reserved(pin)));
        }
    }

    #[test]
    fn test_out_of_range() {
        assert_eq!(validate_pin(-1), Err(PinError::OutOfRange(-1)));
        assert_eq!(validate_pin(30), Err(PinError::OutOfRange(30)));
        assert_eq!(validate_pin(255), Err(PinError::OutOfRange(255)));
        assert_eq!(validate_pin(1000), Err(PinError::OutOfRange(1000)));
    }

    #[test]
    fn test_valid_set_size() {
        let valid = (0..PIN_COUNT as i32)
            .filter(|&p| validate_pin(p).is_ok())
            .count();
        assert_eq!(valid, PIN_COUNT - RESERVED_PINS.len());
    }
}
