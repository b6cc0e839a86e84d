//! Persistent image store
//!
//! The controller's configuration is persisted as one image of typed
//! blocks. On-storage layout:
//!
//! ```text
//! ┌───────────┬─────────┬──────┬─────┬─────────┬─────┬──────┐
//! │ SIGNATURE │ VERSION │ TYPE │ LEN │ PAYLOAD │ ... │ 0xFF │
//! │ 2B (BE)   │ 1B      │ 1B   │ 1B  │ LEN B   │     │ 1B   │
//! └───────────┴─────────┴──────┴─────┴─────────┴─────┴──────┘
//! ```
//!
//! Blocks are written in ascending type order. Block type 0xFF is the end
//! marker and never a data block.

pub mod diff;
pub mod error;
pub mod image;
mod io;

pub use diff::ImageDiff;
pub use error::ImageError;
pub use image::{
    Block, BlockType, EpromImage, ReadReport, DEFAULT_STAGING_CAPACITY, END_MARKER,
    FORMAT_VERSION, MAX_BLOCK_LEN, SIGNATURE,
};
