// tests/common/mod.rs
//! Builds small synthetic RP66V1 files for the integration tests.
#![allow(dead_code)]

use rp66v1_index::{SegmentAttributes, SegmentHeader, StorageUnitLabel, VisibleRecordHeader};
use std::path::{Path, PathBuf};

pub const REP_FSINGL: u8 = 2;
pub const REP_UNORM: u8 = 16;
pub const REP_USHORT: u8 = 15;
pub const REP_UVARI: u8 = 18;
pub const REP_IDENT: u8 = 19;
pub const REP_ASCII: u8 = 20;
pub const REP_OBNAME: u8 = 23;
pub const REP_UNITS: u8 = 27;

pub fn ident(text: &str) -> Vec<u8> {
    let mut bytes = vec![text.len() as u8];
    bytes.extend_from_slice(text.as_bytes());
    bytes
}

pub fn uvari(value: u32) -> Vec<u8> {
    if value < 0x80 {
        vec![value as u8]
    } else if value < 0x4000 {
        vec![0x80 | (value >> 8) as u8, value as u8]
    } else {
        vec![0xC0 | (value >> 24) as u8, (value >> 16) as u8, (value >> 8) as u8, value as u8]
    }
}

pub fn obname(origin: u32, copy: u8, identifier: &str) -> Vec<u8> {
    let mut bytes = uvari(origin);
    bytes.push(copy);
    bytes.extend(ident(identifier));
    bytes
}

/// Writes the components of one EFLR set.
pub struct EflrBuilder {
    data: Vec<u8>,
}

impl EflrBuilder {
    pub fn new(set_type: &str) -> Self {
        // Set with type and name
        let mut data = vec![0xF8];
        data.extend(ident(set_type));
        data.extend(ident("0"));
        EflrBuilder { data }
    }

    /// Template attributes with only a label.
    pub fn template(mut self, labels: &[&str]) -> Self {
        for label in labels {
            self.data.push(0x30);
            self.data.extend(ident(label));
        }
        self
    }

    pub fn object(mut self, origin: u32, copy: u8, identifier: &str) -> Self {
        self.data.push(0x70);
        self.data.extend(obname(origin, copy, identifier));
        self
    }

    fn attribute(mut self, count: usize, rep_code: u8, values: Vec<u8>) -> Self {
        self.data.push(0x2D);
        self.data.extend(uvari(count as u32));
        self.data.push(rep_code);
        self.data.extend(values);
        self
    }

    pub fn idents(self, values: &[&str]) -> Self {
        let bytes = values.iter().flat_map(|v| ident(v)).collect();
        self.attribute(values.len(), REP_IDENT, bytes)
    }

    pub fn units(self, value: &str) -> Self {
        self.attribute(1, REP_UNITS, ident(value))
    }

    pub fn ascii(self, value: &str) -> Self {
        let mut bytes = uvari(value.len() as u32);
        bytes.extend_from_slice(value.as_bytes());
        self.attribute(1, REP_ASCII, bytes)
    }

    pub fn ushort(self, value: u8) -> Self {
        self.attribute(1, REP_USHORT, vec![value])
    }

    pub fn uvaris(self, values: &[u32]) -> Self {
        let bytes = values.iter().flat_map(|&v| uvari(v)).collect();
        self.attribute(values.len(), REP_UVARI, bytes)
    }

    pub fn obnames(self, values: &[(u32, u8, &str)]) -> Self {
        let bytes = values.iter().flat_map(|&(o, c, i)| obname(o, c, i)).collect();
        self.attribute(values.len(), REP_OBNAME, bytes)
    }

    pub fn absent(mut self) -> Self {
        self.data.push(0x00);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

pub fn file_header(id: &str) -> Vec<u8> {
    EflrBuilder::new("FILE-HEADER")
        .template(&["SEQUENCE-NUMBER", "ID"])
        .object(1, 0, "5")
        .ascii("1")
        .ascii(id)
        .build()
}

pub fn origin(file_id: &str) -> Vec<u8> {
    EflrBuilder::new("ORIGIN")
        .template(&["FILE-ID", "FILE-SET-NAME"])
        .object(1, 0, "DLIS_DEFINING_ORIGIN")
        .ascii(file_id)
        .idents(&["SYNTHETIC"])
        .build()
}

/// DEPT (m) and GR (gAPI) are FSINGL, WAVE is four UNORM values.
pub fn channels() -> Vec<u8> {
    EflrBuilder::new("CHANNEL")
        .template(&["LONG-NAME", "REPRESENTATION-CODE", "UNITS", "DIMENSION"])
        .object(2, 0, "DEPT")
        .idents(&["Depth"])
        .ushort(REP_FSINGL)
        .units("m")
        .uvaris(&[1])
        .object(2, 0, "GR")
        .idents(&["Gamma Ray"])
        .ushort(REP_FSINGL)
        .units("gAPI")
        .absent()
        .object(2, 0, "WAVE")
        .idents(&["Waveform"])
        .ushort(REP_UNORM)
        .units("")
        .uvaris(&[4])
        .build()
}

pub fn frames(frame: &str) -> Vec<u8> {
    EflrBuilder::new("FRAME")
        .template(&["DESCRIPTION", "CHANNELS", "INDEX-TYPE"])
        .object(2, 0, frame)
        .idents(&["Main log"])
        .obnames(&[(2, 0, "DEPT"), (2, 0, "GR"), (2, 0, "WAVE")])
        .idents(&["BOREHOLE-DEPTH"])
        .build()
}

pub fn private_eflr() -> Vec<u8> {
    EflrBuilder::new("VENDOR-STUFF")
        .template(&["VALUE"])
        .object(3, 0, "SECRET")
        .idents(&["hidden"])
        .build()
}

pub fn x_axis(frame_number: u32) -> f64 {
    1000.0 + 0.5 * (frame_number - 1) as f64
}

/// IFLR body for frame `frame_number` of the frame built by [`frames`].
pub fn frame_data(frame: &str, frame_number: u32) -> Vec<u8> {
    let mut data = obname(2, 0, frame);
    data.extend(uvari(frame_number));
    data.extend_from_slice(&(x_axis(frame_number) as f32).to_be_bytes());
    data.extend_from_slice(&(frame_number as f32 * 2.0).to_be_bytes());
    for i in 0..4u16 {
        data.extend_from_slice(&(frame_number as u16 * 10 + i).to_be_bytes());
    }
    data
}

#[derive(Debug, Clone)]
struct Record {
    is_eflr: bool,
    is_encrypted: bool,
    lr_type: u8,
    body: Vec<u8>,
}

/// Packs Logical Records into Visible Records of at most `max_vr_length`
/// bytes, splitting records into segments wherever a Visible Record fills.
#[derive(Debug, Clone)]
pub struct DlisBuilder {
    max_vr_length: usize,
    records: Vec<Record>,
}

/// A built file and where its pieces ended up.
#[derive(Debug, Clone)]
pub struct Dlis {
    pub bytes: Vec<u8>,
    /// (Visible Record, LRSH) of the first segment of every record.
    pub records: Vec<(u64, u64)>,
    pub visible_records: Vec<u64>,
}

impl DlisBuilder {
    pub fn new(max_vr_length: usize) -> Self {
        assert!(max_vr_length >= 32);
        DlisBuilder {
            max_vr_length,
            records: Vec::new(),
        }
    }

    pub fn eflr(mut self, lr_type: u8, body: Vec<u8>) -> Self {
        self.records.push(Record {
            is_eflr: true,
            is_encrypted: false,
            lr_type,
            body,
        });
        self
    }

    pub fn encrypted_eflr(mut self, lr_type: u8, body: Vec<u8>) -> Self {
        self.records.push(Record {
            is_eflr: true,
            is_encrypted: true,
            lr_type,
            body,
        });
        self
    }

    pub fn iflr(mut self, lr_type: u8, body: Vec<u8>) -> Self {
        self.records.push(Record {
            is_eflr: false,
            is_encrypted: false,
            lr_type,
            body,
        });
        self
    }

    /// FILE-HEADER, ORIGIN, CHANNEL, FRAME then `frame_count` frames.
    pub fn logical_file_with_frames(self, id: &str, frame: &str, frame_count: u32) -> Self {
        let mut builder = self
            .eflr(0, file_header(id))
            .eflr(1, origin(id))
            .eflr(3, channels())
            .eflr(4, frames(frame));
        for frame_number in 1..=frame_count {
            builder = builder.iflr(0, frame_data(frame, frame_number));
        }
        builder
    }

    pub fn build(&self) -> Dlis {
        let label = StorageUnitLabel::new(1, b"V1.00", b"RECORD", self.max_vr_length as u32, b"Synthetic")
            .expect("valid label");
        let mut bytes = label.as_bytes().to_vec();
        let mut records = Vec::new();
        let mut visible_records = Vec::new();
        let mut vr_start = open_visible_record(&mut bytes, &mut visible_records);

        for record in &self.records {
            let mut offset = 0;
            let mut first = true;
            while first || offset < record.body.len() {
                let mut space = self.max_vr_length - (bytes.len() - vr_start);
                if space < SegmentHeader::MIN_LENGTH as usize {
                    close_visible_record(&mut bytes, vr_start);
                    vr_start = open_visible_record(&mut bytes, &mut visible_records);
                    space = self.max_vr_length - VisibleRecordHeader::SIZE;
                }
                // Leave room for a pad byte.
                let take = (record.body.len() - offset).min(space - SegmentHeader::SIZE - 1);
                let unpadded = SegmentHeader::SIZE + take;
                let pad = if unpadded < SegmentHeader::MIN_LENGTH as usize {
                    SegmentHeader::MIN_LENGTH as usize - unpadded
                } else {
                    unpadded % 2
                };
                let last = offset + take == record.body.len();

                let mut attributes = SegmentAttributes::empty();
                attributes.set_eflr(record.is_eflr);
                attributes.set_encrypted(record.is_encrypted);
                attributes.set_predecessor(!first);
                attributes.set_successor(!last);
                attributes.set_padding(pad > 0);

                if first {
                    records.push((vr_start as u64, bytes.len() as u64));
                }
                bytes.extend_from_slice(&((unpadded + pad) as u16).to_be_bytes());
                bytes.push(attributes.raw_value());
                bytes.push(record.lr_type);
                bytes.extend_from_slice(&record.body[offset..offset + take]);
                if pad > 0 {
                    bytes.extend(std::iter::repeat(0u8).take(pad - 1));
                    bytes.push(pad as u8);
                }
                offset += take;
                first = false;
            }
        }
        close_visible_record(&mut bytes, vr_start);
        Dlis {
            bytes,
            records,
            visible_records,
        }
    }

    pub fn write_to(&self, path: &Path) -> Dlis {
        let dlis = self.build();
        std::fs::write(path, &dlis.bytes).expect("write test file");
        dlis
    }
}

fn open_visible_record(bytes: &mut Vec<u8>, visible_records: &mut Vec<u64>) -> usize {
    let start = bytes.len();
    visible_records.push(start as u64);
    bytes.extend_from_slice(&[0, 0, VisibleRecordHeader::PADDING, VisibleRecordHeader::VERSION]);
    start
}

fn close_visible_record(bytes: &mut [u8], start: usize) {
    let length = (bytes.len() - start) as u16;
    bytes[start..start + 2].copy_from_slice(&length.to_be_bytes());
}

/// The standard test file: one Logical File with 83 frames of Frame Array
/// "50" packed into 256 byte Visible Records.
pub fn standard_builder() -> DlisBuilder {
    DlisBuilder::new(256).logical_file_with_frames("SYNTH-1", "50", 83)
}

pub fn write_standard_file(dir: &Path) -> (PathBuf, Dlis) {
    let path = dir.join("synthetic.dlis");
    let dlis = standard_builder().write_to(&path);
    (path, dlis)
}
