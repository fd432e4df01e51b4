// src/error.rs
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Found schema version {found} but expected {expected}")]
    SchemaVersionMismatch { expected: String, found: String },

    #[error("Invalid Storage Unit Label: {0}")]
    InvalidStorageUnitLabel(String),

    #[error("Malformed Logical File: {0}")]
    MalformedLogicalFile(String),

    #[error("Mismatched counts of LRSH, FrameNumbers and Xaxis: declared {declared}, frames {frames}, lrsh {lrsh}, x axis {x_axis}")]
    MismatchedSequenceLengths {
        declared: usize,
        frames: usize,
        lrsh: usize,
        x_axis: usize,
    },

    #[error("Count mismatch in <{element}> attribute {attribute}: declared {declared} but found {actual}")]
    CountMismatch {
        element: String,
        attribute: &'static str,
        declared: usize,
        actual: usize,
    },

    #[error("Duplicate Frame Array entry {0}")]
    DuplicateFrameArray(String),

    #[error("Inconsistent Log Pass: {0}")]
    InconsistentLogPass(String),

    #[error("LRSH position 0x{0:x} precedes every Visible Record")]
    PositionNotFound(u64),

    #[error("Not a file: {0}")]
    SourceFileMissing(PathBuf),

    #[error("File {path} is not a RP66V1 file but {found}")]
    SourceFileTypeMismatch { path: PathBuf, found: String },

    #[error("Expected single element at {xpath} but found {found}")]
    XPathCardinalityError { xpath: String, found: usize },

    #[error("Got element <{found}> but expected <{expected}>")]
    UnexpectedElement { expected: String, found: String },

    #[error("Element <{element}> is missing attribute {attribute}")]
    MissingAttribute { element: String, attribute: String },

    #[error("Element <{element}> has invalid attribute {attribute}=\"{value}\"")]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
    },

    #[error("Run length encoding requires at least one value")]
    EmptySequence,

    #[error("Invalid Visible Record at offset 0x{position:x}: {reason}")]
    InvalidVisibleRecord { position: u64, reason: String },

    #[error("Invalid Logical Record Segment at offset 0x{position:x}: {reason}")]
    InvalidSegment { position: u64, reason: String },

    #[error("Invalid representation code: {0}")]
    InvalidRepCode(u8),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Logical File {index} out of range, there are {count}")]
    LogicalFileOutOfRange { index: usize, count: usize },

    #[error("Frame Array not found: {0}")]
    FrameArrayNotFound(String),

    #[error("Frame index {index} out of range for Frame Array {frame_array} with {count} frames")]
    FrameOutOfRange {
        frame_array: String,
        index: usize,
        count: usize,
    },

    #[error("Integer overflow: {0}")]
    IntegerOverflow(String),

    #[error("Plot error: {0}")]
    Plot(String),
}

pub type Result<T> = std::result::Result<T, IndexError>;
