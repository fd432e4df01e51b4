// src/raw_data/iflr.rs
use crate::error::{IndexError, Result};
use crate::metadata::{FrameArray, FrameChannel};
use crate::raw_data::RepCodeReader;
use crate::reader::LogicalData;
use crate::types::{ObjectName, RepCode, Value};
use bytes::Bytes;
use std::io::Cursor;

/// Logical Record type of a frame data IFLR.
pub const FDATA: u8 = 0;

/// An Indirectly Formatted Logical Record: one frame of a Frame Array.
#[derive(Debug, Clone)]
pub struct Iflr {
    pub lr_type: u8,
    pub frame_array: ObjectName,
    pub frame_number: u32,
    /// Channel values, everything after the frame number.
    pub frame_data: Bytes,
}

impl Iflr {
    pub fn parse(logical_data: &LogicalData) -> Result<Self> {
        let mut cursor = Cursor::new(logical_data.data.as_ref());
        let frame_array = RepCodeReader::read_obname(&mut cursor)?;
        let frame_number = RepCodeReader::read_uvari(&mut cursor)?;
        let start = cursor.position() as usize;
        Ok(Iflr {
            lr_type: logical_data.lr_type,
            frame_array,
            frame_number,
            frame_data: logical_data.data.slice(start..),
        })
    }

    /// Value of the first channel, as a float.
    pub fn x_axis(&self, frame_array: &FrameArray) -> Result<f64> {
        let channel = frame_array.x_axis().ok_or_else(|| {
            IndexError::InconsistentLogPass(format!("Frame Array {} has no channels", frame_array.name))
        })?;
        let mut cursor = Cursor::new(self.frame_data.as_ref());
        let value = RepCodeReader::read_value(&mut cursor, channel_rep_code(channel)?)?;
        value.as_f64().ok_or_else(|| {
            IndexError::Decode(format!(
                "X axis {} of frame {} is not numeric: {}",
                channel.name, self.frame_number, value
            ))
        })
    }

    /// Every value of every channel in this frame, channel by channel.
    pub fn channel_values(&self, frame_array: &FrameArray) -> Result<Vec<Vec<Value>>> {
        let mut cursor = Cursor::new(self.frame_data.as_ref());
        frame_array
            .channels
            .iter()
            .map(|channel| RepCodeReader::read_values(&mut cursor, channel_rep_code(channel)?, channel.count as usize))
            .collect()
    }
}

fn channel_rep_code(channel: &FrameChannel) -> Result<RepCode> {
    RepCode::from_u8(channel.rep_code).ok_or(IndexError::InvalidRepCode(channel.rep_code))
}
