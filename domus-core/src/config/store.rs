//! Boot-time reconciliation of stored and computed configuration
//!
//! At boot the stored image is loaded, the firmware builds a fresh image
//! from the configuration it wants to run, and the two are diffed. Storage
//! is rewritten only when they differ, which keeps EEPROM wear down to
//! actual configuration changes.

use domus_hal::Eeprom;

use crate::storage::{BlockType, EpromImage, ImageDiff, ImageError};

/// Result of [`ConfigStore::sync`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Fresh image compared against the stored one
    pub diff: ImageDiff,
    /// Bytes written, or `None` if storage was already up to date
    pub bytes_written: Option<usize>,
}

impl SyncOutcome {
    /// Whether storage was rewritten
    pub fn persisted(&self) -> bool {
        self.bytes_written.is_some()
    }

    /// Whether the subsystem owning `block` must be reconfigured
    pub fn needs_reconfigure(&self, block: BlockType) -> bool {
        self.diff.touches(block)
    }
}

/// Owner of the configuration EEPROM and the image last stored on it
pub struct ConfigStore<E> {
    eeprom: E,
    stored: EpromImage,
}

impl<E: Eeprom> ConfigStore<E> {
    /// Create a store; nothing is read until [`ConfigStore::load`]
    pub fn new(eeprom: E) -> Self {
        Self {
            eeprom,
            stored: EpromImage::new(),
        }
    }

    /// Load the stored image
    ///
    /// Any read failure leaves an empty image, the same state as a first
    /// boot.
    pub fn load(&mut self) -> &EpromImage {
        if let Err(e) = self.stored.read(&mut self.eeprom) {
            if !e.is_uninitialized() {
                warn!("stored configuration discarded, starting empty");
            }
        }
        &self.stored
    }

    /// Image last loaded or written
    pub fn stored(&self) -> &EpromImage {
        &self.stored
    }

    /// Make `fresh` the stored image, writing only if it differs
    pub fn sync(&mut self, fresh: EpromImage) -> Result<SyncOutcome, ImageError> {
        let diff = fresh.diff(&self.stored);
        if !diff.has_changes() {
            debug!("stored configuration up to date");
            return Ok(SyncOutcome {
                diff,
                bytes_written: None,
            });
        }

        info!(
            "configuration changed: {} added, {} removed, {} changed",
            diff.added.len(),
            diff.removed.len(),
            diff.changed.len()
        );
        let written = fresh.write(&mut self.eeprom)?;
        self.stored = fresh;

        Ok(SyncOutcome {
            diff,
            bytes_written: Some(written),
        })
    }

    /// Consume the store and return the underlying EEPROM
    pub fn into_eeprom(self) -> E {
        self.eeprom
    }
}
