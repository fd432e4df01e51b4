// src/segment/mod.rs
mod header;
mod storage_unit_label;
mod visible_record;

pub use header::{SegmentAttributes, SegmentHeader};
pub use storage_unit_label::StorageUnitLabel;
pub use visible_record::VisibleRecordHeader;
