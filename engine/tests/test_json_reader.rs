//! Tests for the JSON Lines event file reader

use std::fs;
use std::path::PathBuf;

use overlay_engine_core_rs::{EventReader, JsonLinesReader, ReaderError};

/// Write a test file into the target temp dir and return its path.
fn write_file(name: &str, contents: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("overlay-engine-{}-{}", std::process::id(), name));
    fs::write(&path, contents).expect("failed to write test file");
    path
}

const SAMPLE: &str = r#"{"cross_section": 2.0e6}
{"tracks": [{"pdg_id": 11, "px": 0.0, "py": 0.0, "pz": 1.0, "energy": 1.0, "x": 0.0, "y": 0.0, "z": 0.0, "parent": null}], "weight": 0.5}

{"tracks": [{"pdg_id": 22, "px": 0.1, "py": 0.2, "pz": 0.3, "energy": 0.4, "x": 1.0, "y": 2.0, "z": 3.0, "parent": null}]}
"#;

#[test]
fn test_open_parses_header_cross_section() {
    let path = write_file("header.jsonl", SAMPLE);
    let mut reader = JsonLinesReader::new();
    reader.open(&path).unwrap();

    assert_eq!(reader.cross_section(), 2.0e6);
    fs::remove_file(path).ok();
}

#[test]
fn test_sequential_reads_skip_blank_lines() {
    let path = write_file("sequential.jsonl", SAMPLE);
    let mut reader = JsonLinesReader::new();
    reader.open(&path).unwrap();

    let first = reader.read_next_event().unwrap().expect("first record");
    assert_eq!(first.tracks[0].pdg_id, 11);
    assert_eq!(first.weight, 0.5);

    let second = reader.read_next_event().unwrap().expect("second record");
    assert_eq!(second.tracks[0].pdg_id, 22);
    // Weight defaults to 1.0 when absent.
    assert_eq!(second.weight, 1.0);

    assert!(reader.read_next_event().unwrap().is_none(), "expected EOF");
    fs::remove_file(path).ok();
}

#[test]
fn test_cache_then_random_access() {
    let path = write_file("cache.jsonl", SAMPLE);
    let mut reader = JsonLinesReader::new();
    reader.open(&path).unwrap();

    assert_eq!(reader.num_events(), 0);
    assert_eq!(reader.cache_events().unwrap(), 2);
    assert_eq!(reader.num_events(), 2);

    assert_eq!(reader.read_event(1).unwrap().tracks[0].pdg_id, 22);
    assert_eq!(reader.read_event(0).unwrap().tracks[0].pdg_id, 11);
    assert!(matches!(
        reader.read_event(2),
        Err(ReaderError::NoSuchRecord(2))
    ));
    fs::remove_file(path).ok();
}

#[test]
fn test_missing_header_is_malformed() {
    let path = write_file("noheader.jsonl", "");
    let mut reader = JsonLinesReader::new();
    assert!(matches!(
        reader.open(&path),
        Err(ReaderError::Malformed { .. })
    ));
    fs::remove_file(path).ok();
}

#[test]
fn test_malformed_record_reports_line_number() {
    let contents = "{\"cross_section\": 0.0}\nthis is not json\n";
    let path = write_file("malformed.jsonl", contents);
    let mut reader = JsonLinesReader::new();
    reader.open(&path).unwrap();

    match reader.read_next_event() {
        Err(ReaderError::Malformed { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected malformed record, got {:?}", other.map(|_| ())),
    }
    fs::remove_file(path).ok();
}

#[test]
fn test_missing_file_is_io_error() {
    let mut reader = JsonLinesReader::new();
    let result = reader.open(std::path::Path::new("/nonexistent/events.jsonl"));
    assert!(matches!(result, Err(ReaderError::Io(_))));
}

#[test]
fn test_close_resets_state() {
    let path = write_file("close.jsonl", SAMPLE);
    let mut reader = JsonLinesReader::new();
    reader.open(&path).unwrap();
    reader.cache_events().unwrap();

    reader.close();
    assert_eq!(reader.num_events(), 0);
    assert_eq!(reader.cross_section(), 0.0);
    assert!(matches!(
        reader.read_next_event(),
        Err(ReaderError::NotOpen)
    ));
    fs::remove_file(path).ok();
}
