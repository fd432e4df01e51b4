// src/reader/sync_reader.rs
use crate::error::{IndexError, Result};
use crate::reader::logical_data::{LogicalData, LogicalRecordPosition};
use crate::segment::{SegmentHeader, StorageUnitLabel, VisibleRecordHeader};
use bytes::Bytes;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::trace;

#[cfg(feature = "mmap")]
use memmap2::Mmap;
#[cfg(feature = "mmap")]
use std::io::Cursor;

/// Trait alias for Read + Seek
pub trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

/// Synchronous RP66V1 file reader
pub struct Rp66v1Reader<R: ReadSeek> {
    file: R,
    file_size: u64,
    storage_unit_label: StorageUnitLabel,
}

/// Constructor for standard file I/O
impl Rp66v1Reader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::with_capacity(65536, file))
    }
}

/// Constructor for memory-mapped file I/O (requires "mmap" feature)
#[cfg(feature = "mmap")]
impl Rp66v1Reader<Cursor<Mmap>> {
    pub fn open_mmap(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_reader(Cursor::new(mmap))
    }
}

/// Tracks the Visible Record currently being read.
#[derive(Debug, Clone, Copy)]
struct VisibleRecordCursor {
    vr_position: u64,
    vr_end: u64,
    position: u64,
}

impl<R: ReadSeek> Rp66v1Reader<R> {
    /// Wraps any seekable source, reading and validating the Storage Unit Label.
    pub fn from_reader(mut file: R) -> Result<Self> {
        let file_size = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;
        let mut label = [0u8; StorageUnitLabel::SIZE];
        file.read_exact(&mut label).map_err(|e| match e.kind() {
            std::io::ErrorKind::UnexpectedEof => IndexError::InvalidStorageUnitLabel(format!(
                "file of {} bytes is too short for a Storage Unit Label",
                file_size
            )),
            _ => IndexError::Io(e),
        })?;
        let storage_unit_label = StorageUnitLabel::parse(&label)?;
        Ok(Rp66v1Reader {
            file,
            file_size,
            storage_unit_label,
        })
    }

    pub fn storage_unit_label(&self) -> &StorageUnitLabel {
        &self.storage_unit_label
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Iterates over every Logical Record in file order, recording the
    /// position of every Visible Record it passes through.
    pub fn logical_records(&mut self) -> LogicalRecords<'_, R> {
        let start = StorageUnitLabel::SIZE as u64;
        LogicalRecords {
            reader: self,
            cursor: VisibleRecordCursor {
                vr_position: start,
                vr_end: start,
                position: start,
            },
            visible_records: Vec::new(),
            finished: false,
        }
    }

    /// Random access read of the Logical Record whose first segment header is
    /// at `lrsh_position` inside the Visible Record at `vr_position`.
    pub fn get_file_logical_data(&mut self, vr_position: u64, lrsh_position: u64) -> Result<LogicalData> {
        let mut cursor = self.enter_visible_record(vr_position)?;
        if lrsh_position < cursor.position || lrsh_position >= cursor.vr_end {
            return Err(IndexError::InvalidSegment {
                position: lrsh_position,
                reason: format!(
                    "not inside Visible Record 0x{:x}..0x{:x}",
                    vr_position, cursor.vr_end
                ),
            });
        }
        cursor.position = lrsh_position;
        let mut passed = Vec::new();
        self.read_logical_record(&mut cursor, &mut passed)
    }

    fn enter_visible_record(&mut self, position: u64) -> Result<VisibleRecordCursor> {
        if position + VisibleRecordHeader::SIZE as u64 > self.file_size {
            return Err(IndexError::InvalidVisibleRecord {
                position,
                reason: format!("header runs past end of file at 0x{:x}", self.file_size),
            });
        }
        self.file.seek(SeekFrom::Start(position))?;
        let mut bytes = [0u8; VisibleRecordHeader::SIZE];
        self.file.read_exact(&mut bytes)?;
        let header = VisibleRecordHeader::parse(&bytes, position)?;
        if header.end() > self.file_size {
            return Err(IndexError::InvalidVisibleRecord {
                position,
                reason: format!("length {} runs past end of file at 0x{:x}", header.length, self.file_size),
            });
        }
        trace!("Visible Record at 0x{:x} length {}", position, header.length);
        Ok(VisibleRecordCursor {
            vr_position: position,
            vr_end: header.end(),
            position: position + VisibleRecordHeader::SIZE as u64,
        })
    }

    /// Reads one segment, moving into the next Visible Record first if the
    /// current one is exhausted.
    fn read_segment(
        &mut self,
        cursor: &mut VisibleRecordCursor,
        visible_records: &mut Vec<u64>,
    ) -> Result<(SegmentHeader, Vec<u8>)> {
        if cursor.position >= cursor.vr_end {
            *cursor = self.enter_visible_record(cursor.vr_end)?;
            visible_records.push(cursor.vr_position);
        }
        let position = cursor.position;
        if position + SegmentHeader::SIZE as u64 > cursor.vr_end {
            return Err(IndexError::InvalidSegment {
                position,
                reason: "header overruns the Visible Record".to_string(),
            });
        }
        self.file.seek(SeekFrom::Start(position))?;
        let mut bytes = [0u8; SegmentHeader::SIZE];
        self.file.read_exact(&mut bytes)?;
        let header = SegmentHeader::parse(&bytes, position)?;
        let end = position + header.length as u64;
        if end > cursor.vr_end {
            return Err(IndexError::InvalidSegment {
                position,
                reason: format!(
                    "length {} overruns the Visible Record ending at 0x{:x}",
                    header.length, cursor.vr_end
                ),
            });
        }
        let mut body = vec![0u8; header.body_length()];
        self.file.read_exact(&mut body)?;
        let data_length = header.logical_data_length(&body)?;
        body.truncate(data_length);
        cursor.position = end;
        Ok((header, body))
    }

    fn read_logical_record(
        &mut self,
        cursor: &mut VisibleRecordCursor,
        visible_records: &mut Vec<u64>,
    ) -> Result<LogicalData> {
        let (first, mut data) = self.read_segment(cursor, visible_records)?;
        if first.attributes.has_predecessor() {
            return Err(IndexError::InvalidSegment {
                position: first.position,
                reason: "first segment of a Logical Record has a predecessor".to_string(),
            });
        }
        // read_segment only moves the cursor on before a segment, so it still
        // points at the Visible Record holding the first one.
        let position = LogicalRecordPosition::new(cursor.vr_position, first.position);
        let mut more = first.attributes.has_successor();
        while more {
            if cursor.position >= cursor.vr_end && cursor.vr_end >= self.file_size {
                return Err(IndexError::InvalidSegment {
                    position: first.position,
                    reason: "Logical Record is truncated by end of file".to_string(),
                });
            }
            let (header, body) = self.read_segment(cursor, visible_records)?;
            if !header.attributes.has_predecessor() {
                return Err(IndexError::InvalidSegment {
                    position: header.position,
                    reason: "continuation segment has no predecessor".to_string(),
                });
            }
            if header.lr_type != first.lr_type {
                return Err(IndexError::InvalidSegment {
                    position: header.position,
                    reason: format!(
                        "continuation segment type {} differs from {}",
                        header.lr_type, first.lr_type
                    ),
                });
            }
            data.extend_from_slice(&body);
            more = header.attributes.has_successor();
        }
        Ok(LogicalData {
            position,
            lr_type: first.lr_type,
            is_eflr: first.attributes.is_eflr(),
            is_encrypted: first.attributes.is_encrypted(),
            data: Bytes::from(data),
        })
    }

    fn next_logical_record(
        &mut self,
        cursor: &mut VisibleRecordCursor,
        visible_records: &mut Vec<u64>,
    ) -> Result<Option<LogicalData>> {
        if cursor.position >= cursor.vr_end && cursor.vr_end >= self.file_size {
            return Ok(None);
        }
        self.read_logical_record(cursor, visible_records).map(Some)
    }
}

/// Iterator over the Logical Records of a file, see [`Rp66v1Reader::logical_records`].
pub struct LogicalRecords<'a, R: ReadSeek> {
    reader: &'a mut Rp66v1Reader<R>,
    cursor: VisibleRecordCursor,
    visible_records: Vec<u64>,
    finished: bool,
}

impl<'a, R: ReadSeek> LogicalRecords<'a, R> {
    /// Visible Record positions seen so far, ascending.
    pub fn visible_record_positions(&self) -> &[u64] {
        &self.visible_records
    }

    pub fn into_visible_record_positions(self) -> Vec<u64> {
        self.visible_records
    }
}

impl<'a, R: ReadSeek> Iterator for LogicalRecords<'a, R> {
    type Item = Result<LogicalData>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self
            .reader
            .next_logical_record(&mut self.cursor, &mut self.visible_records)
        {
            Ok(Some(data)) => Some(Ok(data)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}
