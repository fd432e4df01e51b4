// src/metadata/log_pass.rs
use crate::error::{IndexError, Result};
use crate::metadata::{set_type, Eflr, FrameArray};
use crate::types::ObjectName;
use std::collections::HashMap;

/// The Frame Arrays of a Logical File, in FRAME set order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogPass {
    frame_arrays: Vec<FrameArray>,
    lookup: HashMap<ObjectName, usize>,
}

impl LogPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from a CHANNEL and a FRAME set.
    pub fn from_eflrs(channels: &Eflr, frames: &Eflr) -> Result<Self> {
        if channels.set_type != set_type::CHANNEL || frames.set_type != set_type::FRAME {
            return Err(IndexError::InconsistentLogPass(format!(
                "need CHANNEL and FRAME sets but got {} and {}",
                channels.set_type_str(),
                frames.set_type_str()
            )));
        }
        let mut log_pass = LogPass::new();
        for frame in &frames.objects {
            log_pass.push(FrameArray::from_object(frame, channels)?)?;
        }
        Ok(log_pass)
    }

    pub fn push(&mut self, frame_array: FrameArray) -> Result<()> {
        if self.lookup.contains_key(&frame_array.name) {
            return Err(IndexError::DuplicateFrameArray(frame_array.name.to_string()));
        }
        self.lookup.insert(frame_array.name.clone(), self.frame_arrays.len());
        self.frame_arrays.push(frame_array);
        Ok(())
    }

    pub fn get(&self, name: &ObjectName) -> Option<&FrameArray> {
        self.lookup.get(name).map(|&i| &self.frame_arrays[i])
    }

    pub fn contains(&self, name: &ObjectName) -> bool {
        self.lookup.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.frame_arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_arrays.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameArray> {
        self.frame_arrays.iter()
    }
}
