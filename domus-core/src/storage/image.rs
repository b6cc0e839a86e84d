//! Image encoding and decoding

use alloc::collections::btree_map::{self, BTreeMap};
use alloc::vec::Vec;

use domus_hal::Eeprom;

use super::error::ImageError;
use super::io::{Reader, Writer};

/// Image signature, stored big-endian
pub const SIGNATURE: u16 = 0xD05E;

/// Format version this firmware reads and writes
pub const FORMAT_VERSION: u8 = 1;

/// Block type that terminates the block stream
pub const END_MARKER: u8 = 0xFF;

/// Largest payload a block can hold (length is one byte)
pub const MAX_BLOCK_LEN: usize = u8::MAX as usize;

/// Staging buffer used by [`EpromImage::read`]
pub const DEFAULT_STAGING_CAPACITY: usize = MAX_BLOCK_LEN;

/// Signature + version
const HEADER_LEN: usize = 3;

/// Block payload
pub type Block = heapless::Vec<u8, MAX_BLOCK_LEN>;

/// Identifier of a block within an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BlockType(pub u8);

impl BlockType {
    /// Raw identifier
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Whether the identifier is the end marker
    pub const fn is_reserved(self) -> bool {
        self.0 == END_MARKER
    }
}

/// Outcome of a successful read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadReport {
    /// Blocks loaded
    pub blocks: usize,
    /// Bytes consumed, end marker included
    pub bytes: usize,
    /// Blocks whose payload exceeded the staging buffer and lost their tail
    pub truncated: Vec<BlockType>,
}

impl ReadReport {
    /// Whether every block was loaded in full
    pub fn is_complete(&self) -> bool {
        self.truncated.is_empty()
    }
}

/// In-memory image: block type → payload, ordered by type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpromImage {
    blocks: BTreeMap<BlockType, Block>,
}

impl EpromImage {
    /// Create an empty image
    pub const fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
        }
    }

    /// Insert or replace a block
    ///
    /// Returns the previous payload of the block, if any.
    pub fn insert(
        &mut self,
        block: BlockType,
        payload: &[u8],
    ) -> Result<Option<Block>, ImageError> {
        if block.is_reserved() {
            return Err(ImageError::ReservedBlockType);
        }
        let payload = Block::from_slice(payload).map_err(|_| ImageError::PayloadTooLarge {
            block,
            len: payload.len(),
        })?;
        Ok(self.blocks.insert(block, payload))
    }

    /// Payload of a block
    pub fn get(&self, block: BlockType) -> Option<&[u8]> {
        self.blocks.get(&block).map(|payload| payload.as_slice())
    }

    /// Remove a block, returning its payload
    pub fn remove(&mut self, block: BlockType) -> Option<Block> {
        self.blocks.remove(&block)
    }

    /// Whether the image holds a block
    pub fn contains(&self, block: BlockType) -> bool {
        self.blocks.contains_key(&block)
    }

    /// Number of blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the image holds no blocks
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Drop every block
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    /// Blocks in ascending type order
    pub fn iter(&self) -> btree_map::Iter<'_, BlockType, Block> {
        self.blocks.iter()
    }

    /// Block types in ascending order
    pub fn block_types(&self) -> impl Iterator<Item = BlockType> + '_ {
        self.blocks.keys().copied()
    }

    /// Size of the image on storage
    pub fn encoded_len(&self) -> usize {
        let blocks: usize = self.blocks.values().map(|p| 2 + p.len()).sum();
        HEADER_LEN + blocks + 1
    }

    /// Replace the contents with the image stored on `eeprom`
    ///
    /// On error the image is left empty. [`ImageError::BadSignature`] is
    /// the normal outcome for a device that was never written.
    pub fn read<E: Eeprom>(&mut self, eeprom: &mut E) -> Result<ReadReport, ImageError> {
        self.read_with_staging::<E, DEFAULT_STAGING_CAPACITY>(eeprom)
    }

    /// Like [`EpromImage::read`], staging payloads in an `N`-byte buffer
    ///
    /// Payloads longer than `N` keep their first `N` bytes; the rest is
    /// skipped and the block is listed in [`ReadReport::truncated`].
    pub fn read_with_staging<E: Eeprom, const N: usize>(
        &mut self,
        eeprom: &mut E,
    ) -> Result<ReadReport, ImageError> {
        self.blocks.clear();

        let result = self.read_blocks::<E, N>(eeprom);
        match &result {
            Ok(report) => {
                info!("image loaded: {} blocks, {} bytes", report.blocks, report.bytes);
            }
            Err(ImageError::BadSignature) => {
                info!("no image signature, storage uninitialized");
                self.blocks.clear();
            }
            Err(e) => {
                warn!("image read failed: {}", e);
                self.blocks.clear();
            }
        }
        result
    }

    fn read_blocks<E: Eeprom, const N: usize>(
        &mut self,
        eeprom: &mut E,
    ) -> Result<ReadReport, ImageError> {
        let mut reader = Reader::new(eeprom);

        let mut signature = [0u8; 2];
        reader.read_exact(&mut signature)?;
        if u16::from_be_bytes(signature) != SIGNATURE {
            return Err(ImageError::BadSignature);
        }

        let version = reader.read_u8()?;
        if version != FORMAT_VERSION {
            return Err(ImageError::UnsupportedVersion(version));
        }

        let mut report = ReadReport::default();
        let mut staging = [0u8; N];
        loop {
            let block = BlockType(reader.read_u8()?);
            if block.is_reserved() {
                break;
            }

            let len = reader.read_u8()? as usize;
            let kept = len.min(N).min(MAX_BLOCK_LEN);
            reader.read_exact(&mut staging[..kept])?;
            if kept < len {
                reader.skip(len - kept)?;
                warn!(
                    "block {} truncated from {} to {} bytes",
                    block.get(),
                    len,
                    kept
                );
                report.truncated.push(block);
            }

            let payload = Block::from_slice(&staging[..kept])
                .map_err(|_| ImageError::PayloadTooLarge { block, len })?;
            self.blocks.insert(block, payload);
        }

        report.blocks = self.blocks.len();
        report.bytes = reader.offset();
        Ok(report)
    }

    /// Store the image on `eeprom` and commit it
    ///
    /// Returns once the image is durable, with the number of bytes written.
    pub fn write<E: Eeprom>(&self, eeprom: &mut E) -> Result<usize, ImageError> {
        let needed = self.encoded_len();
        let capacity = eeprom.capacity();
        if needed > capacity {
            return Err(ImageError::ImageTooLarge { needed, capacity });
        }

        let mut writer = Writer::new(eeprom);
        writer.write_all(&SIGNATURE.to_be_bytes())?;
        writer.write_u8(FORMAT_VERSION)?;
        for (block, payload) in &self.blocks {
            let len = u8::try_from(payload.len()).map_err(|_| ImageError::PayloadTooLarge {
                block: *block,
                len: payload.len(),
            })?;
            writer.write_u8(block.get())?;
            writer.write_u8(len)?;
            writer.write_all(payload)?;
        }
        writer.write_u8(END_MARKER)?;

        let written = writer.commit()?;
        debug!("image written: {} blocks, {} bytes", self.blocks.len(), written);
        Ok(written)
    }
}

impl<'a> IntoIterator for &'a EpromImage {
    type Item = (&'a BlockType, &'a Block);
    type IntoIter = btree_map::Iter<'a, BlockType, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
