//! File-based tests for trace and script loading

use std::fs;

use memsim::error::SimError;
use memsim::io::{read_script, read_trace, SegmentCommand};
use memsim::segmentation::{Segment, SegmentTable};
use memsim::shell::run_script;
use tempfile::TempDir;

#[test]
fn test_read_trace_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trace.txt");
    fs::write(&path, "7 0 1 2 0 3 0 4\n2 3 0 3 2\n").unwrap();

    let trace = read_trace(&path).unwrap();
    assert_eq!(trace.len(), 13);
    assert_eq!(memsim::simulate_fifo(&trace, 3).unwrap().faults, 10);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = read_trace(dir.path().join("nope.txt"));
    assert!(matches!(result, Err(SimError::Io(_))));
}

#[test]
fn test_bad_trace_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("trace.txt");
    fs::write(&path, "1 2 x").unwrap();

    let err = read_trace(&path).unwrap_err();
    assert_eq!(err.to_string(), "parse error: invalid page number: x");
}

#[test]
fn test_fragmentation_script() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fragment.txt");
    fs::write(
        &path,
        "# three processes fill memory\n\
         init\n\
         alloc 1 400\n\
         alloc 2 300\n\
         alloc 3 300\n\
         release 2\n\
         alloc 4 350   # no hole is big enough\n\
         compact\n\
         alloc 4 300\n\
         show\n",
    )
    .unwrap();

    let commands = read_script(&path).unwrap();
    assert_eq!(commands.len(), 9);
    assert_eq!(commands[5], SegmentCommand::Alloc { pid: 4, size: 350 });

    let mut table = SegmentTable::new();
    let mut out = Vec::new();
    run_script(&commands, &mut table, &mut out).unwrap();
    let output = String::from_utf8(out).unwrap();

    assert!(output.contains("memory allocation failed for process 4 (fragmentation)"));
    assert!(output.contains("Memory Compacted Successfully!"));
    assert_eq!(
        table.segments(),
        &[
            Segment::allocated(0, 400, 1),
            Segment::allocated(400, 300, 3),
            Segment::allocated(700, 300, 4),
        ]
    );
    assert!(output.ends_with("[700 - 999] Allocated (PID: 4)\n"));
}
