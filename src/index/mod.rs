// src/index/mod.rs
//! The in-memory index of a RP66V1 file.
//!
//! A [`LogicalIndex`] is built by one sequential scan of the file, or read
//! back from XML with [`crate::xml::read_index`]. Either way it can resolve
//! any frame of any Frame Array to the exact position of its IFLR.
mod logical_file;
mod logical_index;
mod reconstruction;

pub use logical_file::{IflrReference, LogicalFile};
pub use logical_index::LogicalIndex;
pub use reconstruction::VisibleRecordPositions;
