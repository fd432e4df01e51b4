// src/index/logical_index.rs
use crate::error::{IndexError, Result};
use crate::index::{IflrReference, LogicalFile, VisibleRecordPositions};
use crate::metadata::{set_type, Eflr};
use crate::raw_data::{Iflr, FDATA};
use crate::reader::{LogicalRecordPosition, ReadSeek, Rp66v1Reader};
use crate::segment::StorageUnitLabel;
use crate::types::ObjectName;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, warn};

/// Index of a whole RP66V1 file.
#[derive(Debug, Clone)]
pub struct LogicalIndex {
    pub path: PathBuf,
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub storage_unit_label: StorageUnitLabel,
    pub logical_files: Vec<LogicalFile>,
    pub visible_records: VisibleRecordPositions,
}

impl LogicalIndex {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = Rp66v1Reader::open(path)?;
        Self::scan(&mut reader, path)
    }

    /// Builds the index by reading every Logical Record once, in order.
    pub fn scan<R: ReadSeek>(reader: &mut Rp66v1Reader<R>, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok();
        let size = reader.file_size();
        let storage_unit_label = reader.storage_unit_label().clone();

        let mut logical_files: Vec<LogicalFile> = Vec::new();
        let (mut eflr_count, mut iflr_count) = (0usize, 0usize);
        let mut records = reader.logical_records();
        for logical_data in &mut records {
            let logical_data = logical_data?;
            let position = logical_data.position;
            if logical_data.is_encrypted {
                warn!("Skipping encrypted Logical Record type {} at {}", logical_data.lr_type, position);
                continue;
            }
            if logical_data.is_eflr {
                let eflr = Eflr::parse(logical_data.lr_type, &logical_data.data)?;
                eflr_count += 1;
                if eflr.set_type == set_type::FILE_HEADER {
                    if let Some(previous) = logical_files.last() {
                        previous.validate()?;
                    }
                    debug!("Logical File {} starts at {}", logical_files.len(), position);
                    logical_files.push(LogicalFile::new(position, eflr)?);
                } else {
                    current_logical_file(&mut logical_files, position)?.add_eflr(position, eflr)?;
                }
            } else if logical_data.lr_type == FDATA {
                let iflr = Iflr::parse(&logical_data)?;
                iflr_count += 1;
                current_logical_file(&mut logical_files, position)?.add_iflr(position, &iflr)?;
            } else {
                debug!("Ignoring IFLR type {} at {}", logical_data.lr_type, position);
            }
        }
        let visible_records = VisibleRecordPositions::new(records.into_visible_record_positions())?;
        if let Some(last) = logical_files.last() {
            last.validate()?;
        }
        debug!(
            "Scanned {}: {} Logical Files, {} EFLRs, {} IFLRs, {} Visible Records",
            path.display(),
            logical_files.len(),
            eflr_count,
            iflr_count,
            visible_records.len()
        );
        Ok(LogicalIndex {
            path,
            size,
            modified,
            storage_unit_label,
            logical_files,
            visible_records,
        })
    }

    pub fn logical_file(&self, index: usize) -> Result<&LogicalFile> {
        self.logical_files.get(index).ok_or(IndexError::LogicalFileOutOfRange {
            index,
            count: self.logical_files.len(),
        })
    }

    fn references(&self, logical_file: usize, frame_array: &ObjectName) -> Result<&[IflrReference]> {
        self.logical_file(logical_file)?
            .iflr_references(frame_array)
            .ok_or_else(|| IndexError::FrameArrayNotFound(frame_array.to_string()))
    }

    /// Resolves a frame to the position of its IFLR.
    pub fn resolve_frame(
        &self,
        logical_file: usize,
        frame_array: &ObjectName,
        frame_index: usize,
    ) -> Result<LogicalRecordPosition> {
        let references = self.references(logical_file, frame_array)?;
        let reference = references.get(frame_index).ok_or_else(|| IndexError::FrameOutOfRange {
            frame_array: frame_array.to_string(),
            index: frame_index,
            count: references.len(),
        })?;
        let vr_position = self.visible_records.owning_visible_record(reference.lrsh_position)?;
        Ok(LogicalRecordPosition::new(vr_position, reference.lrsh_position))
    }

    /// Resolves every frame of a Frame Array, in frame order.
    pub fn frame_positions(&self, logical_file: usize, frame_array: &ObjectName) -> Result<Vec<LogicalRecordPosition>> {
        self.references(logical_file, frame_array)?
            .iter()
            .map(|reference| {
                let vr_position = self.visible_records.owning_visible_record(reference.lrsh_position)?;
                Ok(LogicalRecordPosition::new(vr_position, reference.lrsh_position))
            })
            .collect()
    }

    /// Reads and decodes the IFLR of one frame from the original file.
    pub fn read_frame<R: ReadSeek>(
        &self,
        reader: &mut Rp66v1Reader<R>,
        logical_file: usize,
        frame_array: &ObjectName,
        frame_index: usize,
    ) -> Result<Iflr> {
        let position = self.resolve_frame(logical_file, frame_array, frame_index)?;
        let logical_data = reader.get_file_logical_data(position.vr_position, position.lrsh_position)?;
        if logical_data.is_eflr {
            return Err(IndexError::InconsistentLogPass(format!(
                "frame {} of {} resolves to an EFLR at {}",
                frame_index, frame_array, position
            )));
        }
        let iflr = Iflr::parse(&logical_data)?;
        if &iflr.frame_array != frame_array {
            return Err(IndexError::InconsistentLogPass(format!(
                "frame {} of {} resolves to an IFLR of {} at {}",
                frame_index, frame_array, iflr.frame_array, position
            )));
        }
        Ok(iflr)
    }
}

fn current_logical_file(
    logical_files: &mut [LogicalFile],
    position: LogicalRecordPosition,
) -> Result<&mut LogicalFile> {
    logical_files.last_mut().ok_or_else(|| {
        IndexError::MalformedLogicalFile(format!("record at {} precedes any FILE-HEADER", position))
    })
}
