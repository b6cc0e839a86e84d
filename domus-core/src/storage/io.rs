//! Sequential cursors over an EEPROM

use domus_hal::Eeprom;

use super::error::ImageError;

/// Chunk used to step over bytes that are not kept
const SKIP_CHUNK: usize = 32;

pub(super) struct Reader<'a, E> {
    eeprom: &'a mut E,
    offset: usize,
}

impl<'a, E: Eeprom> Reader<'a, E> {
    pub(super) fn new(eeprom: &'a mut E) -> Self {
        Self { eeprom, offset: 0 }
    }

    pub(super) fn offset(&self) -> usize {
        self.offset
    }

    pub(super) fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), ImageError> {
        self.eeprom.read(self.offset, buffer)?;
        self.offset += buffer.len();
        Ok(())
    }

    pub(super) fn read_u8(&mut self) -> Result<u8, ImageError> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    /// Consume `len` bytes without keeping them
    pub(super) fn skip(&mut self, mut len: usize) -> Result<(), ImageError> {
        let mut scratch = [0u8; SKIP_CHUNK];
        while len > 0 {
            let step = len.min(SKIP_CHUNK);
            self.read_exact(&mut scratch[..step])?;
            len -= step;
        }
        Ok(())
    }
}

pub(super) struct Writer<'a, E> {
    eeprom: &'a mut E,
    offset: usize,
}

impl<'a, E: Eeprom> Writer<'a, E> {
    pub(super) fn new(eeprom: &'a mut E) -> Self {
        Self { eeprom, offset: 0 }
    }

    pub(super) fn write_all(&mut self, data: &[u8]) -> Result<(), ImageError> {
        self.eeprom.write(self.offset, data)?;
        self.offset += data.len();
        Ok(())
    }

    pub(super) fn write_u8(&mut self, byte: u8) -> Result<(), ImageError> {
        self.write_all(&[byte])
    }

    /// Flush through to durable storage
    pub(super) fn commit(self) -> Result<usize, ImageError> {
        self.eeprom.commit()?;
        Ok(self.offset)
    }
}
