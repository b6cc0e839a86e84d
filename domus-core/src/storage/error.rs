//! Image store errors

use domus_hal::EepromError;

use super::image::BlockType;

/// Errors from reading, writing or building an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Underlying storage failed
    Storage(EepromError),
    /// Signature missing: storage never initialized, or overwritten
    BadSignature,
    /// Image was written by an incompatible firmware
    UnsupportedVersion(u8),
    /// Storage ended before the end marker
    UnexpectedEnd,
    /// Block type 0xFF cannot hold data
    ReservedBlockType,
    /// Payload longer than a block can hold
    PayloadTooLarge {
        /// Block the payload was meant for
        block: BlockType,
        /// Offending payload length
        len: usize,
    },
    /// Encoded image does not fit the device
    ImageTooLarge {
        /// Bytes the image needs
        needed: usize,
        /// Bytes the device has
        capacity: usize,
    },
}

impl From<EepromError> for ImageError {
    fn from(e: EepromError) -> Self {
        match e {
            EepromError::OutOfBounds => ImageError::UnexpectedEnd,
            other => ImageError::Storage(other),
        }
    }
}

impl ImageError {
    /// Whether the error means "nothing usable stored yet"
    ///
    /// Callers treat these as first boot and fall back to defaults.
    pub fn is_uninitialized(&self) -> bool {
        matches!(self, ImageError::BadSignature)
    }
}
