// src/xml/reader.rs
use crate::error::{IndexError, Result};
use crate::index::{IflrReference, LogicalFile, LogicalIndex, VisibleRecordPositions};
use crate::metadata::Eflr;
use crate::reader::{detect_file_type, BinaryFileType, LogicalRecordPosition, ReadSeek, Rp66v1Reader};
use crate::rle::{Rle, RleItem, RleValue};
use crate::segment::StorageUnitLabel;
use crate::types::ObjectName;
use crate::utils::encode_latin1;
use crate::xml::{parse_timestamp, Element, SCHEMA_VERSION};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads an index document and rebuilds the [`LogicalIndex`] against the
/// original file, found by joining `archive_root` and the recorded path.
pub fn read_index(index_path: impl AsRef<Path>, archive_root: impl AsRef<Path>) -> Result<LogicalIndex> {
    let text = fs::read_to_string(index_path.as_ref())?;
    read_index_from_str(&text, archive_root)
}

pub fn read_index_from_str(text: &str, archive_root: impl AsRef<Path>) -> Result<LogicalIndex> {
    let root = Element::parse(text)?;
    root.expect_name("RP66V1FileIndex")?;
    let schema_version = root.attr("schema_version")?;
    if schema_version != SCHEMA_VERSION {
        return Err(IndexError::SchemaVersionMismatch {
            expected: SCHEMA_VERSION.to_string(),
            found: schema_version.to_string(),
        });
    }

    let path = archive_root.as_ref().join(root.attr("path")?);
    if !path.is_file() {
        return Err(IndexError::SourceFileMissing(path));
    }
    let file_type = detect_file_type(&path)?;
    if file_type != BinaryFileType::Rp66v1 {
        return Err(IndexError::SourceFileTypeMismatch {
            path,
            found: file_type.to_string(),
        });
    }

    let storage_unit_label = read_storage_unit_label(root.single("StorageUnitLabel")?)?;
    let size = root.attr_int::<u64>("size")?;
    let modified = root.attr("utc_file_mtime").ok().and_then(parse_timestamp);

    let mut reader = Rp66v1Reader::open(&path)?;
    let logical_files_element = root.single("LogicalFiles")?;
    let logical_files = logical_files_element
        .children_named("LogicalFile")
        .map(|element| read_logical_file(element, &mut reader))
        .collect::<Result<Vec<_>>>()?;
    check_count(logical_files_element, "count", logical_files.len())?;

    let visible_records = read_rle::<i64>(root.single("VisibleRecords")?)?
        .values()
        .map(|position| to_unsigned(position, "Visible Record position"))
        .collect::<Result<Vec<u64>>>()?;
    let visible_records = VisibleRecordPositions::new(visible_records)?;

    debug!(
        "Read index of {}: {} Logical Files, {} Visible Records",
        path.display(),
        logical_files.len(),
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

fn read_storage_unit_label(element: &Element) -> Result<StorageUnitLabel> {
    let sequence_number = element.attr_int::<i64>("sequence_number")?;
    let sequence_number = u32::try_from(sequence_number).map_err(|_| {
        IndexError::InvalidStorageUnitLabel(format!("sequence number {} must be positive", sequence_number))
    })?;
    StorageUnitLabel::new(
        sequence_number,
        &encode_latin1(element.attr("dlis_version")?)?,
        &encode_latin1(element.attr("storage_unit_structure")?)?,
        element.attr_int("maximum_record_length")?,
        &encode_latin1(element.attr("storage_set_identifier")?)?,
    )
}

fn read_object_name(element: &Element) -> Result<ObjectName> {
    let identifier = element.attr("I")?;
    Ok(ObjectName {
        origin: element.attr_int("O")?,
        copy: element.attr_int("C")?,
        identifier: encode_latin1(identifier).map_err(|_| element.invalid_attr("I", identifier))?,
    })
}

fn read_logical_file<R: ReadSeek>(element: &Element, reader: &mut Rp66v1Reader<R>) -> Result<LogicalFile> {
    let eflr_elements: Vec<&Element> = element.children_named("EFLR").collect();
    let set_types = eflr_elements
        .iter()
        .map(|e| e.attr("set_type").and_then(encode_latin1))
        .collect::<Result<Vec<_>>>()?;
    LogicalFile::check_ordering(&set_types)?;

    let mut logical_file: Option<LogicalFile> = None;
    for (eflr_element, set_type) in eflr_elements.iter().zip(&set_types) {
        let position = LogicalRecordPosition::new(
            eflr_element.attr_int("vr_position")?,
            eflr_element.attr_int("lrsh_position")?,
        );
        let logical_data = reader.get_file_logical_data(position.vr_position, position.lrsh_position)?;
        if !logical_data.is_eflr {
            return Err(IndexError::MalformedLogicalFile(format!(
                "record at {} is not an EFLR",
                position
            )));
        }
        let eflr = Eflr::parse(logical_data.lr_type, &logical_data.data)?;
        if &eflr.set_type != set_type {
            return Err(IndexError::MalformedLogicalFile(format!(
                "EFLR at {} is {} but the index says {}",
                position,
                eflr.set_type_str(),
                eflr_element.attr("set_type")?
            )));
        }
        match logical_file.as_mut() {
            None => logical_file = Some(LogicalFile::new(position, eflr)?),
            Some(lf) => lf.add_eflr(position, eflr)?,
        }
    }
    // check_ordering guarantees at least two EFLRs
    let mut logical_file = logical_file.ok_or_else(|| {
        IndexError::MalformedLogicalFile("Logical File has no EFLRs".to_string())
    })?;

    let has_log_pass = element.attr("has_log_pass")?;
    let declared = match has_log_pass.to_ascii_lowercase().as_str() {
        "true" => true,
        "false" => false,
        _ => return Err(element.invalid_attr("has_log_pass", has_log_pass)),
    };
    if declared != logical_file.has_log_pass() {
        return Err(IndexError::InconsistentLogPass(format!(
            "index says has_log_pass={} but the EFLRs say otherwise",
            has_log_pass
        )));
    }

    if let Some(log_pass_element) = element.optional("LogPass")? {
        read_log_pass(log_pass_element, &mut logical_file)?;
    } else if declared {
        return Err(IndexError::XPathCardinalityError {
            xpath: format!("{}/LogPass", element.name),
            found: 0,
        });
    }
    Ok(logical_file)
}

fn read_log_pass(element: &Element, logical_file: &mut LogicalFile) -> Result<()> {
    let mut seen = HashSet::new();
    for frame_array_element in element.children_named("FrameArray") {
        let name = read_object_name(frame_array_element)?;
        if !seen.insert(name.clone()) {
            return Err(IndexError::DuplicateFrameArray(name.to_string()));
        }
        let frame_array = logical_file
            .log_pass()
            .and_then(|log_pass| log_pass.get(&name))
            .ok_or_else(|| {
                IndexError::InconsistentLogPass(format!("Frame Array {} is not in the Log Pass", name))
            })?;

        let channels_element = frame_array_element.single("Channels")?;
        let channels = channels_element
            .children_named("Channel")
            .map(read_object_name)
            .collect::<Result<Vec<_>>>()?;
        check_count(channels_element, "count", channels.len())?;
        if !channels.iter().eq(frame_array.channels.iter().map(|c| &c.name)) {
            return Err(IndexError::InconsistentLogPass(format!(
                "channels of Frame Array {} differ from the FRAME set",
                name
            )));
        }

        let references = read_iflr_references(frame_array_element.single("IFLR")?)?;
        logical_file.set_iflr_references(name, references)?;
    }
    check_count(element, "count", seen.len())?;
    if let Some(log_pass) = logical_file.log_pass() {
        if let Some(missing) = log_pass.iter().find(|fa| !seen.contains(&fa.name)) {
            return Err(IndexError::InconsistentLogPass(format!(
                "Frame Array {} is missing from the index",
                missing.name
            )));
        }
    }
    Ok(())
}

fn read_iflr_references(element: &Element) -> Result<Vec<IflrReference>> {
    let declared = element.attr_int::<usize>("count")?;
    let frame_numbers: Rle<i64> = read_rle(element.single("FrameNumbers")?)?;
    let lrsh_positions: Rle<i64> = read_rle(element.single("LRSH")?)?;
    let x_axis: Rle<f64> = read_rle(element.single("Xaxis")?)?;
    // read_rle has checked that every total fits a usize
    let lengths = [frame_numbers.num_values(), lrsh_positions.num_values(), x_axis.num_values()].map(|n| n as usize);
    if lengths.iter().any(|&len| len != declared) {
        return Err(IndexError::MismatchedSequenceLengths {
            declared,
            frames: lengths[0],
            lrsh: lengths[1],
            x_axis: lengths[2],
        });
    }
    frame_numbers
        .values()
        .zip(lrsh_positions.values())
        .zip(x_axis.values())
        .map(|((frame_number, lrsh_position), x_axis)| {
            Ok(IflrReference {
                frame_number: u32::try_from(frame_number)
                    .map_err(|_| IndexError::IntegerOverflow(format!("frame number {}", frame_number)))?,
                lrsh_position: to_unsigned(lrsh_position, "LRSH position")?,
                x_axis,
            })
        })
        .collect()
}

/// Reads an RLE block, checking its declared `count` and `rle_len`.
fn read_rle<T: RleValue>(element: &Element) -> Result<Rle<T>> {
    let items = element
        .children_named("RLE")
        .map(|rle| {
            let parse = |name: &str| -> Result<T> {
                let text = rle.attr(name)?;
                T::parse(text).ok_or_else(|| rle.invalid_attr(name, text))
            };
            Ok(RleItem::with_stride(parse("datum")?, parse("stride")?, rle.attr_int("repeat")?))
        })
        .collect::<Result<Vec<_>>>()?;
    let rle = Rle::from_items(items);
    if let Some(item) = rle.first_overflow() {
        return Err(IndexError::IntegerOverflow(format!(
            "<{}> run {:?} overflows",
            element.name, item
        )));
    }
    let num_values = rle
        .checked_num_values()
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| IndexError::IntegerOverflow(format!("<{}> has more values than can be counted", element.name)))?;
    check_count(element, "count", num_values)?;
    check_count(element, "rle_len", rle.len())?;
    Ok(rle)
}

fn check_count(element: &Element, attribute: &'static str, actual: usize) -> Result<()> {
    let declared = element.attr_int::<usize>(attribute)?;
    if declared != actual {
        return Err(IndexError::CountMismatch {
            element: element.name.clone(),
            attribute,
            declared,
            actual,
        });
    }
    Ok(())
}

fn to_unsigned(value: i64, what: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| IndexError::IntegerOverflow(format!("{} {} is negative", what, value)))
}
