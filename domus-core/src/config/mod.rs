//! Subsystem configuration blocks
//!
//! Each subsystem owns one block type and one configuration struct,
//! serialized with postcard into that block's payload. The image store
//! itself treats payloads as opaque bytes; encoding, decoding and
//! validation live here.

pub mod store;
pub mod types;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::gpio::{validate_pin, PinError};
use crate::storage::{BlockType, EpromImage, ImageError, MAX_BLOCK_LEN};

pub use store::{ConfigStore, SyncOutcome};
pub use types::{
    KeyboxConfig, NetworkConfig, ProportionalValveConfig, RfidLockConfig, ShowerGuardConfig,
};

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialization failed or exceeded one block
    Serialize,
    /// Stored payload does not decode
    Deserialize,
    /// Block not present in the image
    Missing(BlockType),
    /// A pin field failed validation
    InvalidPin(PinError),
    /// Two pin fields of one subsystem name the same pin
    PinConflict(u8),
    /// A non-pin field is out of range
    InvalidValue,
    /// Image store rejected the block
    Image(ImageError),
}

impl From<PinError> for ConfigError {
    fn from(e: PinError) -> Self {
        ConfigError::InvalidPin(e)
    }
}

impl From<ImageError> for ConfigError {
    fn from(e: ImageError) -> Self {
        ConfigError::Image(e)
    }
}

/// Configuration persisted as one image block
pub trait BlockConfig: Serialize + DeserializeOwned {
    /// Block type owned by this subsystem; unique across the firmware
    const BLOCK: BlockType;

    /// Raw pin numbers this configuration drives or senses
    fn pins(&self) -> heapless::Vec<u8, 4> {
        heapless::Vec::new()
    }

    /// Check the configuration before it is stored or applied
    ///
    /// The default checks every pin with [`validate_pin`] and rejects
    /// duplicates.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_pins(&self.pins())
    }
}

/// Validate a set of pins used together by one subsystem
pub fn validate_pins(pins: &[u8]) -> Result<(), ConfigError> {
    for (i, &pin) in pins.iter().enumerate() {
        validate_pin(pin as i32)?;
        if pins[..i].contains(&pin) {
            return Err(ConfigError::PinConflict(pin));
        }
    }
    Ok(())
}

impl EpromImage {
    /// Validate, encode and store a subsystem configuration
    pub fn put_config<C: BlockConfig>(&mut self, config: &C) -> Result<(), ConfigError> {
        config.validate()?;

        let mut buffer = [0u8; MAX_BLOCK_LEN];
        let bytes = postcard::to_slice(config, &mut buffer).map_err(|_| ConfigError::Serialize)?;
        self.insert(C::BLOCK, bytes)?;
        Ok(())
    }

    /// Decode a subsystem configuration
    pub fn config<C: BlockConfig>(&self) -> Result<C, ConfigError> {
        let payload = self.get(C::BLOCK).ok_or(ConfigError::Missing(C::BLOCK))?;
        postcard::from_bytes(payload).map_err(|_| ConfigError::Deserialize)
    }
}
