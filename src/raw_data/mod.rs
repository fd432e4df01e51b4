// src/raw_data/mod.rs
//! Decoding of RP66V1 representation codes
//!
//! All RP66V1 numbers are big-endian. [`RepCodeReader`] turns a byte stream
//! into [`Value`](crate::types::Value)s given a representation code, and
//! exposes the primitive readers (UVARI, IDENT, OBNAME...) that the EFLR and
//! IFLR parsers are built from. [`Iflr`] decodes frame data records.
//!
//! # Example
//!
//! ```
//! use rp66v1_index::raw_data::RepCodeReader;
//! use rp66v1_index::types::{RepCode, Value};
//! use std::io::Cursor;
//!
//! let mut cursor = Cursor::new(vec![0x03, b'D', b'E', b'P']);
//! let value = RepCodeReader::read_value(&mut cursor, RepCode::Ident).unwrap();
//! assert_eq!(value, Value::Bytes(b"DEP".to_vec()));
//! ```

mod iflr;
mod reader;

pub use iflr::{Iflr, FDATA};
pub use reader::RepCodeReader;
