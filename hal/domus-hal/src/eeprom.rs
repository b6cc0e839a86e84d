//! Non-volatile storage abstractions
//!
//! Provides a byte-addressed EEPROM-style interface. Writes may be buffered
//! by the implementation; they only become durable once [`Eeprom::commit`]
//! returns.

/// Value of an erased storage cell
pub const ERASED_BYTE: u8 = 0xFF;

/// Errors from non-volatile storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EepromError {
    /// Access past the end of the device
    OutOfBounds,
    /// Underlying flash/EEPROM operation failed
    Flash,
    /// Commit did not complete, contents are not durable
    NotCommitted,
}

/// Byte-addressed non-volatile storage
///
/// Implementations should handle:
/// - Bounds checking against [`Eeprom::capacity`]
/// - Reading back pending (uncommitted) writes
/// - Making `commit` synchronous: it returns only once data is durable
pub trait Eeprom {
    /// Total addressable size in bytes
    fn capacity(&self) -> usize;

    /// Read `buffer.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), EepromError>;

    /// Write `data` starting at `offset`
    ///
    /// The data is not guaranteed durable until [`Eeprom::commit`].
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError>;

    /// Flush pending writes to the physical medium
    fn commit(&mut self) -> Result<(), EepromError>;
}

/// Check that `len` bytes at `offset` fit into a device of `capacity` bytes
pub fn check_bounds(offset: usize, len: usize, capacity: usize) -> Result<(), EepromError> {
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(EepromError::OutOfBounds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(check_bounds(0, 16, 16), Ok(()));
        assert_eq!(check_bounds(15, 1, 16), Ok(()));
        assert_eq!(check_bounds(15, 2, 16), Err(EepromError::OutOfBounds));
        assert_eq!(check_bounds(usize::MAX, 2, 16), Err(EepromError::OutOfBounds));
    }
}
