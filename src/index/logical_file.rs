// src/index/logical_file.rs
use crate::error::{IndexError, Result};
use crate::metadata::{set_type, Eflr, LogPass};
use crate::raw_data::Iflr;
use crate::reader::LogicalRecordPosition;
use crate::types::ObjectName;
use crate::utils::decode_latin1;
use std::collections::HashMap;

/// Where one frame lives, without its Visible Record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IflrReference {
    pub frame_number: u32,
    pub lrsh_position: u64,
    pub x_axis: f64,
}

/// One Logical File: its EFLRs in file order, an optional Log Pass and the
/// IFLR positions of each Frame Array.
#[derive(Debug, Clone)]
pub struct LogicalFile {
    eflrs: Vec<(LogicalRecordPosition, Eflr)>,
    log_pass: Option<LogPass>,
    iflr_references: HashMap<ObjectName, Vec<IflrReference>>,
}

impl LogicalFile {
    /// Starts a Logical File, the EFLR must be a FILE-HEADER.
    pub fn new(position: LogicalRecordPosition, eflr: Eflr) -> Result<Self> {
        if eflr.set_type != set_type::FILE_HEADER {
            return Err(IndexError::MalformedLogicalFile(format!(
                "first EFLR at {} is {} not FILE-HEADER",
                position,
                eflr.set_type_str()
            )));
        }
        Ok(LogicalFile {
            eflrs: vec![(position, eflr)],
            log_pass: None,
            iflr_references: HashMap::new(),
        })
    }

    /// Checks a complete sequence of EFLR set types starts FILE-HEADER, ORIGIN.
    pub fn check_ordering<S: AsRef<[u8]>>(set_types: &[S]) -> Result<()> {
        match set_types {
            [first, second, ..] => {
                if first.as_ref() != set_type::FILE_HEADER {
                    return Err(IndexError::MalformedLogicalFile(format!(
                        "first EFLR is {} not FILE-HEADER",
                        decode_latin1(first.as_ref())
                    )));
                }
                if second.as_ref() != set_type::ORIGIN {
                    return Err(IndexError::MalformedLogicalFile(format!(
                        "second EFLR is {} not ORIGIN",
                        decode_latin1(second.as_ref())
                    )));
                }
                Ok(())
            }
            _ => Err(IndexError::MalformedLogicalFile(format!(
                "needs at least FILE-HEADER and ORIGIN but has {} EFLR(s)",
                set_types.len()
            ))),
        }
    }

    /// Checks the Logical File is complete.
    pub fn validate(&self) -> Result<()> {
        let set_types: Vec<&[u8]> = self.eflrs.iter().map(|(_, e)| e.set_type.as_slice()).collect();
        Self::check_ordering(&set_types)
    }

    pub fn add_eflr(&mut self, position: LogicalRecordPosition, eflr: Eflr) -> Result<()> {
        if self.eflrs.len() == 1 && eflr.set_type != set_type::ORIGIN {
            return Err(IndexError::MalformedLogicalFile(format!(
                "second EFLR at {} is {} not ORIGIN",
                position,
                eflr.set_type_str()
            )));
        }
        if eflr.set_type == set_type::FRAME {
            if self.log_pass.is_some() {
                return Err(IndexError::InconsistentLogPass(format!(
                    "second FRAME set at {}",
                    position
                )));
            }
            let channels = self
                .eflrs
                .iter()
                .rev()
                .map(|(_, e)| e)
                .find(|e| e.set_type == set_type::CHANNEL)
                .ok_or_else(|| {
                    IndexError::InconsistentLogPass(format!("FRAME set at {} precedes any CHANNEL set", position))
                })?;
            let log_pass = LogPass::from_eflrs(channels, &eflr)?;
            for frame_array in log_pass.iter() {
                self.iflr_references.insert(frame_array.name.clone(), Vec::new());
            }
            self.log_pass = Some(log_pass);
        }
        self.eflrs.push((position, eflr));
        Ok(())
    }

    /// Records the position and X axis of a frame.
    pub fn add_iflr(&mut self, position: LogicalRecordPosition, iflr: &Iflr) -> Result<()> {
        let frame_array = self
            .log_pass
            .as_ref()
            .and_then(|log_pass| log_pass.get(&iflr.frame_array))
            .ok_or_else(|| {
                IndexError::InconsistentLogPass(format!(
                    "IFLR at {} belongs to unknown Frame Array {}",
                    position, iflr.frame_array
                ))
            })?;
        let x_axis = iflr.x_axis(frame_array)?;
        let references = self.iflr_references.entry(iflr.frame_array.clone()).or_default();
        references.push(IflrReference {
            frame_number: iflr.frame_number,
            lrsh_position: position.lrsh_position,
            x_axis,
        });
        Ok(())
    }

    /// Replaces the IFLR positions of a Frame Array, e.g. when read from an index.
    pub fn set_iflr_references(&mut self, name: ObjectName, references: Vec<IflrReference>) -> Result<()> {
        if !self.log_pass.as_ref().map_or(false, |log_pass| log_pass.contains(&name)) {
            return Err(IndexError::InconsistentLogPass(format!(
                "Frame Array {} is not in the Log Pass",
                name
            )));
        }
        self.iflr_references.insert(name, references);
        Ok(())
    }

    pub fn eflrs(&self) -> &[(LogicalRecordPosition, Eflr)] {
        &self.eflrs
    }

    pub fn log_pass(&self) -> Option<&LogPass> {
        self.log_pass.as_ref()
    }

    pub fn has_log_pass(&self) -> bool {
        self.log_pass.is_some()
    }

    pub fn iflr_references(&self, name: &ObjectName) -> Option<&[IflrReference]> {
        self.iflr_references.get(name).map(Vec::as_slice)
    }
}
