// src/reader/mod.rs
mod file_type;
mod logical_data;
mod sync_reader;

pub use file_type::{detect_file_type, BinaryFileType};
pub use logical_data::{LogicalData, LogicalRecordPosition};
pub use sync_reader::{LogicalRecords, ReadSeek, Rp66v1Reader};
