// src/metadata/frame_array.rs
use crate::error::{IndexError, Result};
use crate::metadata::{Eflr, Object};
use crate::types::{ObjectName, Value};
use crate::utils::decode_latin1;
use smallvec::SmallVec;

const LONG_NAME: &[u8] = b"LONG-NAME";
const REPRESENTATION_CODE: &[u8] = b"REPRESENTATION-CODE";
const UNITS: &[u8] = b"UNITS";
const DIMENSION: &[u8] = b"DIMENSION";
const CHANNELS: &[u8] = b"CHANNELS";
const DESCRIPTION: &[u8] = b"DESCRIPTION";

/// A Channel as it appears in a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameChannel {
    pub name: ObjectName,
    pub long_name: Vec<u8>,
    pub rep_code: u8,
    pub units: Vec<u8>,
    pub dimensions: SmallVec<[u32; 4]>,
    /// Number of values per frame, the product of the dimensions.
    pub count: u32,
}

impl FrameChannel {
    pub fn new(
        name: ObjectName,
        long_name: impl Into<Vec<u8>>,
        rep_code: u8,
        units: impl Into<Vec<u8>>,
        dimensions: &[u32],
    ) -> Self {
        let dimensions: SmallVec<[u32; 4]> = if dimensions.is_empty() {
            SmallVec::from_slice(&[1])
        } else {
            SmallVec::from_slice(dimensions)
        };
        let count = dimensions.iter().product();
        FrameChannel {
            name,
            long_name: long_name.into(),
            rep_code,
            units: units.into(),
            dimensions,
            count,
        }
    }

    /// Builds from an object of a CHANNEL set.
    pub fn from_object(object: &Object) -> Result<Self> {
        let inconsistent = |what: &str| {
            IndexError::InconsistentLogPass(format!("Channel {} {}", object.name, what))
        };
        let long_name = object
            .attribute(LONG_NAME)
            .and_then(|a| a.first_value())
            .and_then(Value::as_bytes)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let rep_code = object
            .attribute(REPRESENTATION_CODE)
            .and_then(|a| a.first_value())
            .and_then(Value::as_i64)
            .ok_or_else(|| inconsistent("has no REPRESENTATION-CODE"))?;
        let rep_code = u8::try_from(rep_code).map_err(|_| inconsistent("has an invalid REPRESENTATION-CODE"))?;
        let units = object
            .attribute(UNITS)
            .and_then(|a| a.first_value())
            .and_then(Value::as_bytes)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let dimensions = match object.attribute(DIMENSION) {
            Some(attribute) => attribute
                .values()
                .iter()
                .map(|v| {
                    v.as_i64()
                        .and_then(|d| u32::try_from(d).ok())
                        .ok_or_else(|| inconsistent("has an invalid DIMENSION"))
                })
                .collect::<Result<Vec<u32>>>()?,
            None => Vec::new(),
        };
        Ok(Self::new(object.name.clone(), long_name, rep_code, units, &dimensions))
    }
}

/// A FRAME object and its Channels in frame order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameArray {
    pub name: ObjectName,
    pub description: Vec<u8>,
    pub channels: Vec<FrameChannel>,
}

impl FrameArray {
    pub fn new(name: ObjectName, description: impl Into<Vec<u8>>) -> Self {
        FrameArray {
            name,
            description: description.into(),
            channels: Vec::new(),
        }
    }

    /// Builds from an object of a FRAME set, resolving its CHANNELS in `channels`.
    pub fn from_object(frame: &Object, channels: &Eflr) -> Result<Self> {
        let description = frame
            .attribute(DESCRIPTION)
            .and_then(|a| a.first_value())
            .and_then(Value::as_bytes)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();
        let mut frame_array = FrameArray::new(frame.name.clone(), description);
        if let Some(attribute) = frame.attribute(CHANNELS) {
            for value in attribute.values() {
                let name = match value {
                    Value::ObjectName(name) => name,
                    other => {
                        return Err(IndexError::InconsistentLogPass(format!(
                            "Frame {} lists {} as a channel",
                            frame.name, other
                        )))
                    }
                };
                let object = channels.object(name).ok_or_else(|| {
                    IndexError::InconsistentLogPass(format!(
                        "Frame {} references missing Channel {}",
                        frame.name, name
                    ))
                })?;
                frame_array.channels.push(FrameChannel::from_object(object)?);
            }
        }
        Ok(frame_array)
    }

    /// The first channel is the index (X axis) of the frame.
    pub fn x_axis(&self) -> Option<&FrameChannel> {
        self.channels.first()
    }

    pub fn description_str(&self) -> String {
        decode_latin1(&self.description)
    }
}
