// tests/xml_tests.rs
mod common;

use common::*;
use rp66v1_index::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn frame_name() -> ObjectName {
    ObjectName::new(2, 0, "50")
}

fn index_text(index: &LogicalIndex, options: &IndexOptions) -> String {
    let mut output = Vec::new();
    write_index(index, &mut output, options).unwrap();
    String::from_utf8(output).unwrap()
}

fn standard_index(dir: &Path) -> (LogicalIndex, String) {
    let (path, _) = write_standard_file(dir);
    let index = LogicalIndex::from_path(path).unwrap();
    let text = index_text(&index, &IndexOptions::default());
    (index, text)
}

/// Replaces the first occurrence of `from` at or after `after`.
fn replace_after(text: &str, after: &str, from: &str, to: &str) -> String {
    let start = text.find(after).expect("anchor present");
    let offset = start + text[start..].find(from).expect("target present");
    format!("{}{}{}", &text[..offset], to, &text[offset + from.len()..])
}

#[test]
fn test_round_trip() {
    let dir = TempDir::new().unwrap();
    let (index, text) = standard_index(dir.path());
    let read = read_index_from_str(&text, "").unwrap();

    assert_eq!(read.path, index.path);
    assert_eq!(read.size, index.size);
    assert_eq!(read.storage_unit_label, index.storage_unit_label);
    assert_eq!(read.visible_records, index.visible_records);
    assert_eq!(read.logical_files.len(), 1);
    let (a, b) = (&read.logical_files[0], &index.logical_files[0]);
    assert_eq!(a.eflrs(), b.eflrs());
    assert_eq!(a.log_pass().unwrap().get(&frame_name()), b.log_pass().unwrap().get(&frame_name()));
    assert_eq!(a.iflr_references(&frame_name()), b.iflr_references(&frame_name()));
    assert_eq!(
        read.frame_positions(0, &frame_name()).unwrap(),
        index.frame_positions(0, &frame_name()).unwrap()
    );

    // Whole seconds survive the timestamp text.
    let secs = |t: std::time::SystemTime| t.duration_since(std::time::UNIX_EPOCH).unwrap().as_secs();
    assert_eq!(secs(read.modified.unwrap()), secs(index.modified.unwrap()));

    // Writing again gives the same document apart from utc_now.
    let again = index_text(&read, &IndexOptions::default());
    let strip = |s: &str| s.lines().filter(|l| !l.contains("utc_now")).collect::<Vec<_>>().join("\n");
    assert_eq!(strip(&again), strip(&text));
}

#[test]
fn test_document_layout() {
    let dir = TempDir::new().unwrap();
    let (index, text) = standard_index(dir.path());

    assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(text.contains("schema_version=\"0.1.0\""));
    assert!(text.contains(&format!("size=\"{}\"", index.size)));
    assert!(text.contains("<StorageUnitLabel sequence_number=\"1\" dlis_version=\"V1.00\" storage_unit_structure=\"RECORD\" maximum_record_length=\"256\""));
    assert!(text.contains("<LogicalFiles count=\"1\">"));
    assert!(text.contains("<LogicalFile index=\"0\" has_log_pass=\"True\">"));
    assert!(text.contains("<EFLR vr_position=\"0x50\" lrsh_position=\"0x54\" lr_type=\"0\" set_type=\"FILE-HEADER\""));
    assert!(text.contains("<LogPass count=\"1\">"));
    assert!(text.contains("<FrameArray O=\"2\" C=\"0\" I=\"50\" description=\"Main log\" x_axis=\"DEPT\" x_units=\"m\">"));
    assert!(text.contains("<Channels count=\"3\">"));
    assert!(text.contains("<Channel O=\"2\" C=\"0\" I=\"WAVE\" long_name=\"Waveform\" rep_code=\"16\" units=\"\" dimensions=\"4\" count=\"4\"/>"));
    assert!(text.contains("<IFLR count=\"83\">"));
    assert!(text.contains("<FrameNumbers count=\"83\" rle_len=\"1\">"));
    assert!(text.contains("<RLE datum=\"1\" stride=\"1\" repeat=\"82\"/>"));
    assert!(text.contains("<Xaxis count=\"83\" rle_len=\"1\">"));
    assert!(text.contains("<RLE datum=\"1000.0\" stride=\"0.5\" repeat=\"82\"/>"));
    assert!(text.contains(&format!(
        "<VisibleRecords count=\"{}\" rle_len=",
        index.visible_records.len()
    )));
    assert!(text.contains("<ObjectName O=\"2\" C=\"0\" I=\"DEPT\"/>"));
    assert!(text.contains("<Value type=\"bytes\" value=\"Main log\"/>"));
}

#[test]
fn test_positions_compress() {
    let dir = TempDir::new().unwrap();
    let (index, _) = standard_index(dir.path());
    let references = index.logical_files[0].iflr_references(&frame_name()).unwrap();
    let lrsh: Rle<i64> = references.iter().map(|r| r.lrsh_position as i64).collect();
    assert_eq!(lrsh.num_values(), 83);
    // Runs only break where a frame starts a new Visible Record or is split.
    assert!(lrsh.len() < 83 / 2, "{} runs", lrsh.len());
    assert_eq!(
        lrsh.values().map(|v| v as u64).collect::<Vec<_>>(),
        references.iter().map(|r| r.lrsh_position).collect::<Vec<_>>()
    );
}

#[test]
fn test_private_objects() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("private.dlis");
    standard_builder().eflr(200, private_eflr()).write_to(&path);
    let index = LogicalIndex::from_path(&path).unwrap();

    let public = index_text(&index, &IndexOptions::default());
    assert!(public.contains("set_type=\"VENDOR-STUFF\""));
    assert!(!public.contains("SECRET"));
    let private = index_text(&index, &IndexOptions { private: true });
    assert!(private.contains("<Object O=\"3\" C=\"0\" I=\"SECRET\">"));

    // Either form reads back, EFLRs come from the original file.
    for text in [public, private] {
        let read = read_index_from_str(&text, "").unwrap();
        assert_eq!(read.logical_files[0].eflrs().len(), 5);
    }
}

#[test]
fn test_relocated_archive() {
    let dir = TempDir::new().unwrap();
    let (path, _) = write_standard_file(dir.path());
    let mut reader = Rp66v1Reader::open(&path).unwrap();
    let index = LogicalIndex::scan(&mut reader, "synthetic.dlis").unwrap();
    assert!(index.modified.is_none());

    let index_path = dir.path().join("synthetic.dlis.xml");
    write_index(&index, fs::File::create(&index_path).unwrap(), &IndexOptions::default()).unwrap();
    let read = read_index(&index_path, dir.path()).unwrap();
    assert_eq!(read.path, path);
    assert_eq!(read.frame_positions(0, &frame_name()).unwrap().len(), 83);

    assert!(matches!(
        read_index(&index_path, dir.path().join("elsewhere")),
        Err(IndexError::SourceFileMissing(_))
    ));
}

#[test]
fn test_schema_version_mismatch() {
    let dir = TempDir::new().unwrap();
    let (_, text) = standard_index(dir.path());
    let text = text.replace("schema_version=\"0.1.0\"", "schema_version=\"0.2.0\"");
    match read_index_from_str(&text, "") {
        Err(IndexError::SchemaVersionMismatch { expected, found }) => {
            assert_eq!(expected, "0.1.0");
            assert_eq!(found, "0.2.0");
        }
        other => panic!("unexpected {:?}", other.map(|i| i.path)),
    }
}

#[test]
fn test_source_file_checks() {
    let dir = TempDir::new().unwrap();
    let (index, text) = standard_index(dir.path());

    fs::write(&index.path, vec![b'x'; 200]).unwrap();
    assert!(matches!(
        read_index_from_str(&text, ""),
        Err(IndexError::SourceFileTypeMismatch { .. })
    ));

    fs::remove_file(&index.path).unwrap();
    assert!(matches!(
        read_index_from_str(&text, ""),
        Err(IndexError::SourceFileMissing(_))
    ));
}

#[test]
fn test_invalid_storage_unit_label() {
    let dir = TempDir::new().unwrap();
    let (_, text) = standard_index(dir.path());
    let text = text.replace("sequence_number=\"1\"", "sequence_number=\"-1\"");
    assert!(matches!(
        read_index_from_str(&text, ""),
        Err(IndexError::InvalidStorageUnitLabel(_))
    ));
}

#[test]
fn test_count_mismatches() {
    let dir = TempDir::new().unwrap();
    let (_, text) = standard_index(dir.path());

    let bad = text.replace("<LogicalFiles count=\"1\">", "<LogicalFiles count=\"2\">");
    assert!(matches!(
        read_index_from_str(&bad, ""),
        Err(IndexError::CountMismatch { attribute: "count", declared: 2, actual: 1, .. })
    ));

    let bad = text.replace("<FrameNumbers count=\"83\"", "<FrameNumbers count=\"84\"");
    assert!(matches!(
        read_index_from_str(&bad, ""),
        Err(IndexError::CountMismatch { declared: 84, actual: 83, .. })
    ));

    let bad = text.replace("<Channels count=\"3\">", "<Channels count=\"2\">");
    assert!(matches!(
        read_index_from_str(&bad, ""),
        Err(IndexError::CountMismatch { declared: 2, actual: 3, .. })
    ));
}

#[test]
fn test_mismatched_sequence_lengths() {
    let dir = TempDir::new().unwrap();
    let (_, text) = standard_index(dir.path());
    let bad = text.replace("<FrameNumbers count=\"83\"", "<FrameNumbers count=\"82\"");
    let bad = replace_after(&bad, "<FrameNumbers", "repeat=\"82\"", "repeat=\"81\"");
    match read_index_from_str(&bad, "") {
        Err(IndexError::MismatchedSequenceLengths { declared, frames, lrsh, x_axis }) => {
            assert_eq!((declared, frames, lrsh, x_axis), (83, 82, 83, 83));
        }
        other => panic!("unexpected {:?}", other.map(|i| i.path)),
    }
}

#[test]
fn test_duplicate_frame_array() {
    let dir = TempDir::new().unwrap();
    let (_, text) = standard_index(dir.path());
    let start = text.find("<FrameArray").unwrap();
    let end = text.find("</FrameArray>").unwrap() + "</FrameArray>".len();
    let bad = format!("{}{}{}", &text[..end], &text[start..end], &text[end..]);
    assert!(matches!(
        read_index_from_str(&bad, ""),
        Err(IndexError::DuplicateFrameArray(_))
    ));
}

#[test]
fn test_eflr_ordering() {
    let dir = TempDir::new().unwrap();
    let (_, text) = standard_index(dir.path());
    let bad = text.replace("set_type=\"ORIGIN\"", "set_type=\"CHANNEL\"");
    assert!(matches!(
        read_index_from_str(&bad, ""),
        Err(IndexError::MalformedLogicalFile(_))
    ));
}

#[test]
fn test_missing_elements() {
    let dir = TempDir::new().unwrap();
    let (_, text) = standard_index(dir.path());

    let start = text.find("<VisibleRecords").unwrap();
    let end = text.find("</VisibleRecords>").unwrap() + "</VisibleRecords>".len();
    let bad = format!("{}{}", &text[..start], &text[end..]);
    assert!(matches!(
        read_index_from_str(&bad, ""),
        Err(IndexError::XPathCardinalityError { found: 0, .. })
    ));

    let start = text.find("<LogPass").unwrap();
    let end = text.find("</LogPass>").unwrap() + "</LogPass>".len();
    let bad = format!("{}{}", &text[..start], &text[end..]);
    assert!(matches!(
        read_index_from_str(&bad, ""),
        Err(IndexError::XPathCardinalityError { found: 0, .. })
    ));
}

#[test]
fn test_log_pass_disagrees_with_file() {
    let dir = TempDir::new().unwrap();
    let (_, text) = standard_index(dir.path());
    let bad = text.replace("has_log_pass=\"True\"", "has_log_pass=\"False\"");
    assert!(matches!(
        read_index_from_str(&bad, ""),
        Err(IndexError::InconsistentLogPass(_))
    ));
    let bad = text.replace("I=\"GR\" long_name", "I=\"SP\" long_name");
    assert!(matches!(
        read_index_from_str(&bad, ""),
        Err(IndexError::InconsistentLogPass(_))
    ));
}
