use std::fs;
use std::path::Path;

use crate::constants::*;
use crate::error::{ParseError, SimError};

/// One line of a segmentation script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentCommand {
    Init,
    Alloc { pid: ProcessId, size: usize },
    Release { pid: ProcessId },
    Compact,
    Show,
}

/// Parse a whitespace-separated page reference string
pub fn parse_trace(content: &str) -> Result<Vec<PageId>, ParseError> {
    content
        .split_whitespace()
        .map(|token| {
            token
                .parse::<PageId>()
                .map_err(|_| ParseError::InvalidPage(token.to_string()))
        })
        .collect()
}

pub fn read_trace<P: AsRef<Path>>(path: P) -> Result<Vec<PageId>, SimError> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(parse_trace(&content)?)
}

/// Parse a segmentation script
///
/// One command per line: `init`, `alloc PID SIZE`, `release PID`, `compact`
/// or `show`. Blank lines and text after `#` are ignored.
pub fn parse_script(content: &str) -> Result<Vec<SegmentCommand>, ParseError> {
    let mut commands = Vec::new();

    for (i, raw) in content.lines().enumerate() {
        let line = i + 1;
        let text = raw.split('#').next().unwrap_or("");
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let Some((&name, args)) = tokens.split_first() else {
            continue;
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "init" => {
                expect_args(line, name, args, 0)?;
                SegmentCommand::Init
            }
            "alloc" | "allocate" => {
                expect_args(line, name, args, 2)?;
                SegmentCommand::Alloc {
                    pid: parse_number(line, args[0])?,
                    size: parse_number(line, args[1])?,
                }
            }
            "release" | "free" => {
                expect_args(line, name, args, 1)?;
                SegmentCommand::Release {
                    pid: parse_number(line, args[0])?,
                }
            }
            "compact" => {
                expect_args(line, name, args, 0)?;
                SegmentCommand::Compact
            }
            "show" | "display" => {
                expect_args(line, name, args, 0)?;
                SegmentCommand::Show
            }
            _ => {
                return Err(ParseError::UnknownCommand {
                    line,
                    command: name.to_string(),
                });
            }
        };
        commands.push(command);
    }

    Ok(commands)
}

pub fn read_script<P: AsRef<Path>>(path: P) -> Result<Vec<SegmentCommand>, SimError> {
    let content = fs::read_to_string(path.as_ref())?;
    Ok(parse_script(&content)?)
}

fn expect_args(line: usize, command: &str, args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() != expected {
        return Err(ParseError::WrongArity {
            line,
            command: command.to_string(),
            expected,
            found: args.len(),
        });
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(line: usize, token: &str) -> Result<T, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}
