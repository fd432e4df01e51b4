// src/xml/mod.rs
//! XML serialization of a [`LogicalIndex`](crate::index::LogicalIndex).
//!
//! The document mirrors the index: the Storage Unit Label, every Logical
//! File with its EFLR positions and Log Pass, and the Visible Record
//! positions. The three IFLR sequences of each Frame Array and the Visible
//! Record positions are run length encoded.
//!
//! Reading a document back re-reads the EFLRs from the original file at
//! their recorded positions, so the original must be available.
mod element;
mod reader;
mod writer;

pub use element::Element;
pub use reader::{read_index, read_index_from_str};
pub use writer::{write_index, IndexOptions};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::time::SystemTime;

/// Version of the document layout written and accepted.
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Written as the `creator` of every document.
pub const CREATOR: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub(crate) fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(text: &str) -> Option<SystemTime> {
    let naive = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()?;
    Some(SystemTime::from(Utc.from_utc_datetime(&naive)))
}
