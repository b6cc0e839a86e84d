//! Block-level comparison of two images
//!
//! Used at boot to compare the freshly built image against the stored one:
//! only a non-empty diff costs an EEPROM write, and only subsystems whose
//! blocks appear in it are reconfigured.

use alloc::vec::Vec;

use super::image::{BlockType, EpromImage};

/// Blocks that differ between two images
///
/// Relative to `a.diff(b)`: `added` are in `a` only, `removed` in `b` only,
/// `changed` in both with different payloads. Each list is in ascending
/// block order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageDiff {
    /// Present here, absent from the other image
    pub added: Vec<BlockType>,
    /// Present in the other image, absent here
    pub removed: Vec<BlockType>,
    /// Present in both with different payloads
    pub changed: Vec<BlockType>,
}

impl ImageDiff {
    /// Whether any block differs
    pub fn has_changes(&self) -> bool {
        !(self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty())
    }

    /// Whether `block` appears in any category
    pub fn touches(&self, block: BlockType) -> bool {
        self.added.contains(&block)
            || self.removed.contains(&block)
            || self.changed.contains(&block)
    }
}

impl EpromImage {
    /// Compare this image against `other`
    pub fn diff(&self, other: &EpromImage) -> ImageDiff {
        let mut diff = ImageDiff::default();
        self.diff_into(
            other,
            Some(&mut diff.added),
            Some(&mut diff.removed),
            Some(&mut diff.changed),
        );
        diff
    }

    /// Compare this image against `other`, appending to the lists given
    ///
    /// Returns true if any block differs, whether or not its category was
    /// asked for.
    pub fn diff_into(
        &self,
        other: &EpromImage,
        mut added: Option<&mut Vec<BlockType>>,
        mut removed: Option<&mut Vec<BlockType>>,
        mut changed: Option<&mut Vec<BlockType>>,
    ) -> bool {
        let mut differs = false;

        for (block, payload) in self {
            match other.get(*block) {
                None => {
                    differs = true;
                    if let Some(added) = added.as_deref_mut() {
                        added.push(*block);
                    }
                }
                Some(theirs) if theirs != payload.as_slice() => {
                    differs = true;
                    if let Some(changed) = changed.as_deref_mut() {
                        changed.push(*block);
                    }
                }
                Some(_) => {}
            }
        }

        for block in other.block_types().filter(|b| !self.contains(*b)) {
            differs = true;
            if let Some(removed) = removed.as_deref_mut() {
                removed.push(block);
            }
        }

        differs
    }
}
