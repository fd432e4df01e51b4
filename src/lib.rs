// src/lib.rs
//! # rp66v1-index
//!
//! Compact, lossless XML indexes of RP66V1 (DLIS) well-log files.
//!
//! An index records where every Logical Record of a file lives so that any
//! frame can later be fetched with a single seek. Frame numbers, IFLR
//! positions, X axis values and Visible Record positions are run length
//! encoded, which typically makes the index a small fraction of the file.
//!
//! ## Features
//!
//! - 📦 **Compact**: Arithmetic-progression run length encoding of positions
//! - 🔁 **Lossless**: An index read back resolves every frame of the original
//! - 🔒 **Validated**: Counts, orderings and the source file are cross-checked on read
//! - ⚡ **Batch**: Index whole directory trees with a pool of worker threads
//!
//! ## Quick Start
//!
//! ### Writing an index
//!
//! ```rust,no_run
//! use rp66v1_index::*;
//!
//! fn main() -> Result<()> {
//!     let index = LogicalIndex::from_path("survey.dlis")?;
//!     let output = std::fs::File::create("survey.dlis.xml")?;
//!     write_index(&index, output, &IndexOptions::default())?;
//!     Ok(())
//! }
//! ```
//!
//! ### Reading a frame through an index
//!
//! ```rust,no_run
//! use rp66v1_index::*;
//!
//! fn main() -> Result<()> {
//!     let index = read_index("index/survey.dlis.xml", "archive")?;
//!     let mut reader = Rp66v1Reader::open(&index.path)?;
//!     let frame_array = ObjectName::new(2, 0, "50");
//!     let iflr = index.read_frame(&mut reader, 0, &frame_array, 10)?;
//!     println!("Frame {} has {} bytes", iflr.frame_number, iflr.frame_data.len());
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod error;
pub mod index;
pub mod metadata;
pub mod raw_data;
pub mod reader;
pub mod rle;
pub mod segment;
pub mod types;
pub mod xml;

mod utils;

pub use error::{IndexError, Result};

pub use types::{DateTime, ObjectName, RepCode, Value};

pub use rle::{Radix, Rle, RleItem, RleValue};

pub use segment::{SegmentAttributes, SegmentHeader, StorageUnitLabel, VisibleRecordHeader};

pub use reader::{detect_file_type, BinaryFileType, LogicalData, LogicalRecordPosition, Rp66v1Reader};

pub use raw_data::{Iflr, RepCodeReader};

pub use metadata::{Eflr, FrameArray, FrameChannel, LogPass};

pub use index::{IflrReference, LogicalFile, LogicalIndex, VisibleRecordPositions};

pub use xml::{read_index, read_index_from_str, write_index, IndexOptions, SCHEMA_VERSION};

pub use batch::{BatchConfig, IndexResult};

pub mod prelude {
    //! Convenient imports for common use cases.
    //!
    //! ```rust
    //! use rp66v1_index::prelude::*;
    //! ```

    pub use crate::error::{IndexError, Result};
    pub use crate::index::LogicalIndex;
    pub use crate::reader::Rp66v1Reader;
    pub use crate::rle::Rle;
    pub use crate::types::ObjectName;
    pub use crate::xml::{read_index, write_index, IndexOptions};
}

/// The library version
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");
