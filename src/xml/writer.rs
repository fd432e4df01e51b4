// src/xml/writer.rs
use crate::error::{IndexError, Result};
use crate::index::{LogicalFile, LogicalIndex};
use crate::metadata::{Eflr, FrameArray};
use crate::rle::{Radix, Rle, RleValue};
use crate::segment::StorageUnitLabel;
use crate::types::{ObjectName, Value};
use crate::utils::decode_latin1;
use crate::xml::{format_timestamp, CREATOR, SCHEMA_VERSION};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;
use std::time::SystemTime;

/// Options for [`write_index`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexOptions {
    /// Write the objects of private EFLRs as well as public ones.
    pub private: bool,
}

type Attributes<'a> = [(&'a str, String)];

struct XmlStream<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlStream<W> {
    fn new(output: W) -> Self {
        XmlStream {
            writer: Writer::new_with_indent(output, b' ', 2),
        }
    }

    fn declaration(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    fn start(name: &str, attributes: &Attributes<'_>) -> BytesStart<'static> {
        BytesStart::new(name.to_string())
            .with_attributes(attributes.iter().map(|(key, value)| (*key, value.as_str())))
    }

    fn element<F>(&mut self, name: &str, attributes: &Attributes<'_>, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.writer.write_event(Event::Start(Self::start(name, attributes)))?;
        body(self)?;
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attributes: &Attributes<'_>) -> Result<()> {
        self.writer.write_event(Event::Empty(Self::start(name, attributes)))?;
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.writer.write_event(Event::Text(BytesText::new("\n")))?;
        self.writer.into_inner().flush()?;
        Ok(())
    }
}

/// Writes `index` as an XML document.
///
/// Positions are hexadecimal, frame numbers and X axis values decimal. The
/// EFLR objects are written for public record types, and for private ones
/// too if `options.private` is set.
pub fn write_index<W: Write>(index: &LogicalIndex, output: W, options: &IndexOptions) -> Result<()> {
    let mut xml = XmlStream::new(output);
    xml.declaration()?;
    let attributes = [
        ("path", index.path.to_string_lossy().into_owned()),
        ("size", index.size.to_string()),
        ("schema_version", SCHEMA_VERSION.to_string()),
        ("utc_file_mtime", index.modified.map(format_timestamp).unwrap_or_default()),
        ("utc_now", format_timestamp(SystemTime::now())),
        ("creator", CREATOR.to_string()),
    ];
    xml.element("RP66V1FileIndex", &attributes, |xml| {
        write_storage_unit_label(xml, &index.storage_unit_label)?;
        let count = [("count", index.logical_files.len().to_string())];
        xml.element("LogicalFiles", &count, |xml| {
            for (i, logical_file) in index.logical_files.iter().enumerate() {
                write_logical_file(xml, i, logical_file, options)?;
            }
            Ok(())
        })?;
        let visible_records = index
            .visible_records
            .iter()
            .map(|position| to_signed(position, "Visible Record position"))
            .collect::<Result<Rle<i64>>>()?;
        write_rle(xml, "VisibleRecords", &visible_records, Radix::Hexadecimal)
    })?;
    xml.finish()
}

fn write_storage_unit_label<W: Write>(xml: &mut XmlStream<W>, sul: &StorageUnitLabel) -> Result<()> {
    xml.empty(
        "StorageUnitLabel",
        &[
            ("sequence_number", sul.sequence_number.to_string()),
            ("dlis_version", decode_latin1(&sul.dlis_version)),
            ("storage_unit_structure", decode_latin1(&sul.storage_unit_structure)),
            ("maximum_record_length", sul.maximum_record_length.to_string()),
            ("storage_set_identifier", decode_latin1(&sul.storage_set_identifier)),
        ],
    )
}

fn write_logical_file<W: Write>(
    xml: &mut XmlStream<W>,
    index: usize,
    logical_file: &LogicalFile,
    options: &IndexOptions,
) -> Result<()> {
    let has_log_pass = if logical_file.has_log_pass() { "True" } else { "False" };
    let attributes = [("index", index.to_string()), ("has_log_pass", has_log_pass.to_string())];
    xml.element("LogicalFile", &attributes, |xml| {
        for (position, eflr) in logical_file.eflrs() {
            let attributes = [
                ("vr_position", format!("0x{:x}", position.vr_position)),
                ("lrsh_position", format!("0x{:x}", position.lrsh_position)),
                ("lr_type", eflr.lr_type.to_string()),
                ("set_type", decode_latin1(&eflr.set_type)),
                ("set_name", decode_latin1(&eflr.set_name)),
                ("object_count", eflr.objects.len().to_string()),
            ];
            xml.element("EFLR", &attributes, |xml| {
                if options.private || eflr.is_public() {
                    write_objects(xml, eflr)?;
                }
                Ok(())
            })?;
        }
        if let Some(log_pass) = logical_file.log_pass() {
            xml.element("LogPass", &[("count", log_pass.len().to_string())], |xml| {
                for frame_array in log_pass.iter() {
                    write_frame_array(xml, logical_file, frame_array)?;
                }
                Ok(())
            })?;
        }
        Ok(())
    })
}

fn object_name_attributes(name: &ObjectName) -> [(&'static str, String); 3] {
    [
        ("O", name.origin.to_string()),
        ("C", name.copy.to_string()),
        ("I", name.identifier_str()),
    ]
}

fn write_objects<W: Write>(xml: &mut XmlStream<W>, eflr: &Eflr) -> Result<()> {
    for object in &eflr.objects {
        xml.element("Object", &object_name_attributes(&object.name), |xml| {
            for attribute in &object.attributes {
                let attributes = [
                    ("label", attribute.label_str()),
                    ("count", attribute.count.to_string()),
                    ("rc", attribute.rep_code.to_string()),
                    ("rc_ascii", attribute.rep_code_name().to_string()),
                    ("units", decode_latin1(&attribute.units)),
                ];
                xml.element("Attribute", &attributes, |xml| {
                    for value in attribute.values() {
                        match value {
                            Value::ObjectName(name) => xml.empty("ObjectName", &object_name_attributes(name))?,
                            other => xml.empty(
                                "Value",
                                &[("type", other.type_tag().to_string()), ("value", other.to_string())],
                            )?,
                        }
                    }
                    Ok(())
                })?;
            }
            Ok(())
        })?;
    }
    Ok(())
}

fn write_frame_array<W: Write>(
    xml: &mut XmlStream<W>,
    logical_file: &LogicalFile,
    frame_array: &FrameArray,
) -> Result<()> {
    let references = logical_file.iflr_references(&frame_array.name).ok_or_else(|| {
        IndexError::InconsistentLogPass(format!("no IFLR entries for Frame Array {}", frame_array.name))
    })?;
    let (x_axis, x_units) = match frame_array.x_axis() {
        Some(channel) => (channel.name.identifier_str(), decode_latin1(&channel.units)),
        None => (String::new(), String::new()),
    };
    let mut attributes = object_name_attributes(&frame_array.name).to_vec();
    attributes.push(("description", frame_array.description_str()));
    attributes.push(("x_axis", x_axis));
    attributes.push(("x_units", x_units));
    xml.element("FrameArray", &attributes, |xml| {
        xml.element("Channels", &[("count", frame_array.channels.len().to_string())], |xml| {
            for channel in &frame_array.channels {
                let dimensions: Vec<String> = channel.dimensions.iter().map(u32::to_string).collect();
                let mut attributes = object_name_attributes(&channel.name).to_vec();
                attributes.push(("long_name", decode_latin1(&channel.long_name)));
                attributes.push(("rep_code", channel.rep_code.to_string()));
                attributes.push(("units", decode_latin1(&channel.units)));
                attributes.push(("dimensions", dimensions.join(",")));
                attributes.push(("count", channel.count.to_string()));
                xml.empty("Channel", &attributes)?;
            }
            Ok(())
        })?;
        let frame_numbers: Rle<i64> = references.iter().map(|r| r.frame_number as i64).collect();
        let lrsh_positions = references
            .iter()
            .map(|r| to_signed(r.lrsh_position, "LRSH position"))
            .collect::<Result<Rle<i64>>>()?;
        let x_axis: Rle<f64> = references.iter().map(|r| r.x_axis).collect();
        xml.element("IFLR", &[("count", references.len().to_string())], |xml| {
            write_rle(xml, "FrameNumbers", &frame_numbers, Radix::Decimal)?;
            write_rle(xml, "LRSH", &lrsh_positions, Radix::Hexadecimal)?;
            write_rle(xml, "Xaxis", &x_axis, Radix::Decimal)
        })
    })
}

fn write_rle<W: Write, T: RleValue>(xml: &mut XmlStream<W>, name: &str, rle: &Rle<T>, radix: Radix) -> Result<()> {
    let attributes = [("count", rle.num_values().to_string()), ("rle_len", rle.len().to_string())];
    xml.element(name, &attributes, |xml| {
        for item in rle.items() {
            xml.empty(
                "RLE",
                &[
                    ("datum", item.datum.format(radix)),
                    ("stride", item.stride.format(radix)),
                    ("repeat", item.repeat.to_string()),
                ],
            )?;
        }
        Ok(())
    })
}

fn to_signed(value: u64, what: &str) -> Result<i64> {
    i64::try_from(value).map_err(|_| IndexError::IntegerOverflow(format!("{} 0x{:x}", what, value)))
}
