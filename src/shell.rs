//! Interactive menu driver and script runner
//!
//! Both are generic over their input and output so they can be driven from
//! stdin/stdout or from in-memory buffers.

use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::constants::*;
use crate::error::SimError;
use crate::io::SegmentCommand;
use crate::paging::{self, Algorithm};
use crate::segmentation::SegmentTable;

/// Whitespace-separated token reader, like `scanf("%d")` over a stream
pub struct Scanner<R> {
    reader: R,
    pending: Vec<String>,
}

impl<R: BufRead> Scanner<R> {
    pub fn new(reader: R) -> Self {
        Scanner {
            reader,
            pending: Vec::new(),
        }
    }

    /// Next token, or `None` at end of input
    pub fn token(&mut self) -> Result<Option<String>, SimError> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            // Stored reversed so pop() yields tokens in order
            self.pending = line.split_whitespace().rev().map(str::to_string).collect();
        }
        Ok(self.pending.pop())
    }

    /// Next token parsed as `T`; `Some(Err(token))` if it does not parse
    pub fn next_value<T: FromStr>(&mut self) -> Result<Option<Result<T, String>>, SimError> {
        Ok(self
            .token()?
            .map(|token| token.parse::<T>().map_err(|_| token)))
    }
}

/// Outcome of reading one value from the user
enum Input<T> {
    Value(T),
    Invalid(String),
    Eof,
}

/// The classic menu-driven simulator session
///
/// The segment table stays `None` until the user first enters the
/// segmentation menu.
pub struct Shell<R, W> {
    input: Scanner<R>,
    out: W,
    table: Option<SegmentTable>,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Shell {
            input: Scanner::new(input),
            out,
            table: None,
        }
    }

    pub fn table(&self) -> Option<&SegmentTable> {
        self.table.as_ref()
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn read<T: FromStr>(&mut self) -> Result<Input<T>, SimError> {
        Ok(match self.input.next_value::<T>()? {
            Some(Ok(value)) => Input::Value(value),
            Some(Err(token)) => Input::Invalid(token),
            None => Input::Eof,
        })
    }

    /// Run the main menu until the user exits or input runs out
    pub fn run(&mut self) -> Result<(), SimError> {
        loop {
            writeln!(self.out)?;
            writeln!(self.out, "--- Virtual Memory Management ---")?;
            writeln!(self.out, "1. Paging (FIFO / LRU / Optimal)")?;
            writeln!(self.out, "2. Segmentation + Fragmentation")?;
            writeln!(self.out, "3. Compact Memory")?;
            writeln!(self.out, "4. Exit")?;
            write!(self.out, "Choose an option: ")?;
            self.out.flush()?;

            match self.read::<u32>()? {
                Input::Value(1) => {
                    if !self.paging_menu()? {
                        return Ok(());
                    }
                }
                Input::Value(2) => {
                    if !self.segmentation_menu()? {
                        return Ok(());
                    }
                }
                Input::Value(3) => self.compact()?,
                Input::Value(4) => {
                    writeln!(self.out, "Exiting...")?;
                    return Ok(());
                }
                Input::Eof => return Ok(()),
                _ => writeln!(self.out, "Invalid option!")?,
            }
        }
    }

    /// Returns `false` when input ran out mid-dialogue
    fn paging_menu(&mut self) -> Result<bool, SimError> {
        write!(self.out, "Enter number of pages: ")?;
        self.out.flush()?;
        let count = match self.read::<usize>()? {
            Input::Value(n) if n <= MAX_TRACE_LEN => n,
            Input::Value(_) | Input::Invalid(_) => {
                writeln!(self.out, "Number of pages must be between 0 and {}.", MAX_TRACE_LEN)?;
                return Ok(true);
            }
            Input::Eof => return Ok(false),
        };

        write!(self.out, "Enter page reference string: ")?;
        self.out.flush()?;
        let mut trace = Vec::with_capacity(count);
        while trace.len() < count {
            match self.read::<PageId>()? {
                Input::Value(page) => trace.push(page),
                Input::Invalid(token) => {
                    writeln!(self.out, "Invalid page number: {}", token)?;
                    return Ok(true);
                }
                Input::Eof => return Ok(false),
            }
        }

        write!(self.out, "Enter number of frames: ")?;
        self.out.flush()?;
        let frames = match self.read::<usize>()? {
            Input::Value(n) => n,
            Input::Invalid(token) => {
                writeln!(self.out, "Invalid frame count: {}", token)?;
                return Ok(true);
            }
            Input::Eof => return Ok(false),
        };

        writeln!(self.out, "Choose algorithm:")?;
        writeln!(self.out, "1. FIFO\n2. LRU\n3. Optimal\n4. Compare all")?;
        write!(self.out, "Choice: ")?;
        self.out.flush()?;
        let algorithms: Vec<Algorithm> = match self.read::<u32>()? {
            Input::Value(1) => vec![Algorithm::Fifo],
            Input::Value(2) => vec![Algorithm::Lru],
            Input::Value(3) => vec![Algorithm::Optimal],
            Input::Value(4) => Algorithm::ALL.to_vec(),
            Input::Eof => return Ok(false),
            _ => {
                writeln!(self.out, "Invalid option.")?;
                return Ok(true);
            }
        };

        let labelled = algorithms.len() > 1;
        for algorithm in algorithms {
            match algorithm.simulate(&trace, frames) {
                Ok(stats) => {
                    if labelled {
                        writeln!(self.out, "{}:", algorithm)?;
                    }
                    writeln!(self.out, "{}", stats)?;
                }
                Err(err) => {
                    writeln!(self.out, "Error: {}", err)?;
                    break;
                }
            }
        }
        Ok(true)
    }

    /// Starts a fresh segmentation session; returns `false` on end of input
    fn segmentation_menu(&mut self) -> Result<bool, SimError> {
        let table = self.table.get_or_insert_with(SegmentTable::new);
        table.initialize();

        loop {
            writeln!(self.out)?;
            writeln!(self.out, "Segmentation Menu:")?;
            writeln!(self.out, "1. Allocate Segment\n2. Display Memory\n3. Release Segment\n4. Back")?;
            write!(self.out, "Choice: ")?;
            self.out.flush()?;

            match self.read::<u32>()? {
                Input::Value(1) => {
                    write!(self.out, "Enter Process ID and Segment Size: ")?;
                    self.out.flush()?;
                    let pid = match self.read::<ProcessId>()? {
                        Input::Value(pid) => pid,
                        Input::Invalid(token) => {
                            writeln!(self.out, "Invalid process id: {}", token)?;
                            continue;
                        }
                        Input::Eof => return Ok(false),
                    };
                    let size = match self.read::<usize>()? {
                        Input::Value(size) => size,
                        Input::Invalid(token) => {
                            writeln!(self.out, "Invalid segment size: {}", token)?;
                            continue;
                        }
                        Input::Eof => return Ok(false),
                    };
                    self.apply(SegmentCommand::Alloc { pid, size })?;
                }
                Input::Value(2) => self.apply(SegmentCommand::Show)?,
                Input::Value(3) => {
                    write!(self.out, "Enter Process ID: ")?;
                    self.out.flush()?;
                    match self.read::<ProcessId>()? {
                        Input::Value(pid) => self.apply(SegmentCommand::Release { pid })?,
                        Input::Invalid(token) => writeln!(self.out, "Invalid process id: {}", token)?,
                        Input::Eof => return Ok(false),
                    }
                }
                Input::Eof => return Ok(false),
                _ => return Ok(true),
            }
        }
    }

    fn compact(&mut self) -> Result<(), SimError> {
        if self.table.is_none() {
            writeln!(self.out, "Error: {}", SimError::Uninitialized)?;
            return Ok(());
        }
        self.apply(SegmentCommand::Compact)?;
        self.apply(SegmentCommand::Show)
    }

    fn apply(&mut self, command: SegmentCommand) -> Result<(), SimError> {
        let table = self.table.as_mut().ok_or(SimError::Uninitialized)?;
        execute(command, table, &mut self.out)
    }
}

/// Apply one segmentation command and report the outcome to `out`
///
/// Allocation and release failures are reported, not returned: the session
/// carries on exactly as it would after a successful command.
pub fn execute<W: Write>(command: SegmentCommand, table: &mut SegmentTable, out: &mut W) -> Result<(), SimError> {
    match command {
        SegmentCommand::Init => {
            table.initialize();
            writeln!(out, "Memory initialized ({} units).", table.memory_size())?;
        }
        SegmentCommand::Alloc { pid, size } => match table.allocate(pid, size) {
            Ok(_) => writeln!(out, "Segment allocated to Process {}", pid)?,
            Err(err) => writeln!(out, "{}", err)?,
        },
        SegmentCommand::Release { pid } => match table.release(pid) {
            Ok(freed) => writeln!(out, "Released {} units from Process {}", freed, pid)?,
            Err(err) => writeln!(out, "{}", err)?,
        },
        SegmentCommand::Compact => {
            table.compact();
            writeln!(out, "Memory Compacted Successfully!")?;
        }
        SegmentCommand::Show => {
            writeln!(out)?;
            write!(out, "{}", table.display())?;
        }
    }
    Ok(())
}

/// Run a parsed script against `table`
pub fn run_script<W: Write>(commands: &[SegmentCommand], table: &mut SegmentTable, out: &mut W) -> Result<(), SimError> {
    for &command in commands {
        execute(command, table, out)?;
    }
    Ok(())
}

/// Run every algorithm and print a side-by-side summary
pub fn write_comparison<W: Write>(trace: &[PageId], frame_count: usize, out: &mut W) -> Result<(), SimError> {
    writeln!(out, "{:<10} {:>8} {:>8} {:>10}", "Algorithm", "Faults", "Hits", "Hit ratio")?;
    for (algorithm, stats) in paging::compare(trace, frame_count)? {
        writeln!(
            out,
            "{:<10} {:>8} {:>8} {:>9.1}%",
            algorithm.to_string(),
            stats.faults,
            stats.hits,
            stats.hit_ratio() * 100.0
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_session(input: &str) -> (String, Option<SegmentTable>) {
        let mut shell = Shell::new(input.as_bytes(), Vec::new());
        shell.run().unwrap();
        let table = shell.table().cloned();
        let output = String::from_utf8(shell.into_output()).unwrap();
        (output, table)
    }

    #[test]
    fn test_scanner_tokens_across_lines() {
        let mut scanner = Scanner::new("1 2\n\n  3\nx".as_bytes());
        assert_eq!(scanner.next_value::<u32>().unwrap(), Some(Ok(1)));
        assert_eq!(scanner.next_value::<u32>().unwrap(), Some(Ok(2)));
        assert_eq!(scanner.next_value::<u32>().unwrap(), Some(Ok(3)));
        assert_eq!(scanner.next_value::<u32>().unwrap(), Some(Err("x".to_string())));
        assert_eq!(scanner.next_value::<u32>().unwrap(), None);
    }

    #[test]
    fn test_paging_session() {
        let (output, _) = run_session("1\n13\n7 0 1 2 0 3 0 4 2 3 0 3 2\n3\n2\n4\n");
        assert!(output.contains("Page Hits: 4\nPage Faults: 9"));
        assert!(output.ends_with("Exiting...\n"));
    }

    #[test]
    fn test_paging_session_compare_all() {
        let (output, _) = run_session("1\n5\n1 2 3 4 1\n3\n4\n4\n");
        assert!(output.contains("FIFO:"));
        assert!(output.contains("LRU:"));
        assert!(output.contains("Optimal:"));
    }

    #[test]
    fn test_paging_session_rejects_zero_frames() {
        let (output, _) = run_session("1\n3\n1 2 3\n0\n1\n4\n");
        assert!(output.contains("Error: frame count must be at least 1"));
    }

    #[test]
    fn test_segmentation_session() {
        let (output, table) = run_session("2\n1\n1 300\n1\n2 200\n2\n4\n4\n");

        assert!(output.contains("Segment allocated to Process 1"));
        assert!(output.contains("[0 - 299] Allocated (PID: 1)"));
        assert!(output.contains("[300 - 499] Allocated (PID: 2)"));
        assert!(output.contains("[500 - 999] Hole (PID: none)"));
        assert_eq!(table.unwrap().segments().len(), 3);
    }

    #[test]
    fn test_fragmentation_then_compaction() {
        let input = "2\n\
                     1\n1 400\n1\n2 300\n1\n3 300\n\
                     3\n2\n\
                     1\n4 350\n\
                     4\n\
                     3\n4\n";
        let (output, table) = run_session(input);

        assert!(output.contains("memory allocation failed for process 4 (fragmentation)"));
        assert!(output.contains("Memory Compacted Successfully!"));
        assert!(output.contains("[700 - 999] Hole (PID: none)"));
        assert_eq!(table.unwrap().largest_hole(), 300);
    }

    #[test]
    fn test_compact_before_initialization() {
        let (output, table) = run_session("3\n4\n");
        assert!(output.contains("Error: memory not initialized"));
        assert!(table.is_none());
    }

    #[test]
    fn test_reentering_segmentation_resets_table() {
        let (_, table) = run_session("2\n1\n1 300\n4\n2\n4\n4\n");
        assert_eq!(table.unwrap(), SegmentTable::new());
    }

    #[test]
    fn test_invalid_option_and_eof() {
        let (output, _) = run_session("9\nabc\n");
        assert_eq!(output.matches("Invalid option!").count(), 2);
        assert!(!output.contains("Exiting..."));
    }

    #[test]
    fn test_run_script() {
        let commands = [
            SegmentCommand::Alloc { pid: 1, size: 600 },
            SegmentCommand::Alloc { pid: 2, size: 600 },
            SegmentCommand::Show,
        ];
        let mut table = SegmentTable::new();
        let mut out = Vec::new();
        run_script(&commands, &mut table, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        assert!(output.contains("Segment allocated to Process 1"));
        assert!(output.contains("memory allocation failed for process 2"));
        assert!(output.contains("[600 - 999] Hole (PID: none)"));
    }

    #[test]
    fn test_write_comparison() {
        let mut out = Vec::new();
        write_comparison(&[7, 0, 1, 2, 0, 3, 0, 4, 2, 3, 0, 3, 2], 3, &mut out).unwrap();
        let output = String::from_utf8(out).unwrap();

        assert_eq!(output.lines().count(), 4);
        assert!(output.lines().nth(1).unwrap().starts_with("FIFO"));
        assert!(output.contains("30.8%"));
    }
}
