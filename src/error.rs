//! Error types for the simulator

use thiserror::Error;

use crate::constants::{MAX_FRAMES, MAX_TRACE_LEN, ProcessId};

/// Top-level error type used by the binary and the script runner
#[derive(Error, Debug)]
pub enum SimError {
    #[error("paging error: {0}")]
    Paging(#[from] PagingError),

    #[error("segmentation error: {0}")]
    Segment(#[from] SegmentError),

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("memory not initialized")]
    Uninitialized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Precondition violations rejected before a paging simulation starts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PagingError {
    #[error("frame count must be at least 1")]
    NoFrames,

    #[error("frame count {0} exceeds maximum of {max}", max = MAX_FRAMES)]
    TooManyFrames(usize),

    #[error("trace of {0} references exceeds maximum of {max}", max = MAX_TRACE_LEN)]
    TraceTooLong(usize),
}

/// Failures reported by the segment allocator; the table is left untouched
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("segment size must be at least 1")]
    ZeroSize,

    #[error(
        "memory allocation failed for process {pid} (fragmentation): \
         requested {requested}, largest hole {largest_hole}, total free {free}"
    )]
    Fragmentation {
        pid: ProcessId,
        requested: usize,
        largest_hole: usize,
        free: usize,
    },

    #[error("segment table is full ({0} entries)")]
    TableFull(usize),

    #[error("process {0} owns no segments")]
    UnknownProcess(ProcessId),
}

/// Errors from reading traces and segment scripts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid page number: {0}")]
    InvalidPage(String),

    #[error("line {line}: invalid number: {token}")]
    InvalidNumber { line: usize, token: String },

    #[error("line {line}: unknown command: {command}")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: {command} expects {expected} argument(s), got {found}")]
    WrongArity {
        line: usize,
        command: String,
        expected: usize,
        found: usize,
    },
}
