//! Emulated EEPROM in the last flash sector
//!
//! The sector is mirrored in RAM. Reads and writes go to the shadow;
//! `commit` erases the sector and programs the shadow back with blocking
//! flash calls, so it returns only once the data is durable.

use domus_hal::eeprom::{check_bounds, ERASED_BYTE};
use domus_hal::{Eeprom, EepromError};
use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;

/// Flash size of the controller board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB

/// Size of the emulated EEPROM, one erase sector
pub const EEPROM_SIZE: usize = ERASE_SIZE;

/// Offset of the EEPROM sector from the start of flash
pub const EEPROM_OFFSET: u32 = (FLASH_SIZE - EEPROM_SIZE) as u32;

/// RP2040 emulated EEPROM
pub struct FlashEeprom<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    shadow: [u8; EEPROM_SIZE],
    dirty: bool,
}

impl<'d> FlashEeprom<'d> {
    /// Open the EEPROM sector and load it into RAM
    pub fn new(flash: Peri<'d, FLASH>) -> Result<Self, EepromError> {
        let mut eeprom = Self {
            flash: Flash::new_blocking(flash),
            shadow: [ERASED_BYTE; EEPROM_SIZE],
            dirty: false,
        };
        eeprom
            .flash
            .blocking_read(EEPROM_OFFSET, &mut eeprom.shadow)
            .map_err(|_| EepromError::Flash)?;
        info!("eeprom loaded at flash offset {=u32:#x}", EEPROM_OFFSET);
        Ok(eeprom)
    }

    /// Whether the shadow holds writes not yet committed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Eeprom for FlashEeprom<'_> {
    fn capacity(&self) -> usize {
        EEPROM_SIZE
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), EepromError> {
        check_bounds(offset, buffer.len(), EEPROM_SIZE)?;
        buffer.copy_from_slice(&self.shadow[offset..offset + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), EepromError> {
        check_bounds(offset, data.len(), EEPROM_SIZE)?;
        let target = &mut self.shadow[offset..offset + data.len()];
        if target != data {
            target.copy_from_slice(data);
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), EepromError> {
        if !self.dirty {
            return Ok(());
        }

        let end = EEPROM_OFFSET + EEPROM_SIZE as u32;
        self.flash
            .blocking_erase(EEPROM_OFFSET, end)
            .map_err(|_| EepromError::NotCommitted)?;
        self.flash
            .blocking_write(EEPROM_OFFSET, &self.shadow)
            .map_err(|_| EepromError::NotCommitted)?;

        self.dirty = false;
        info!("eeprom committed");
        Ok(())
    }
}
