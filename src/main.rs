//! memsim - page replacement and segmentation simulator
//!
//! Usage: memsim [-v...] <COMMAND>
//!
//! Commands:
//!   paging       Count page faults for FIFO, LRU and/or Optimal replacement
//!   belady       Search a trace for Belady's anomaly under FIFO
//!   segments     Run a segmentation script (init/alloc/release/compact/show)
//!   interactive  Menu-driven session on stdin/stdout

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

use memsim::error::SimError;
use memsim::io::{parse_trace, read_script, read_trace};
use memsim::paging::{self, Algorithm};
use memsim::segmentation::SegmentTable;
use memsim::shell::{self, Shell};
use memsim::{MAX_FRAMES, MAX_SEGMENTS, PageId};

#[derive(Parser)]
#[command(name = "memsim")]
#[command(about = "Page replacement and segment allocation simulator")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct TraceSource {
    /// Page reference string, e.g. "7 0 1 2 0 3"
    #[arg(short, long)]
    trace: Option<String>,

    /// File containing a whitespace-separated page reference string
    #[arg(long)]
    trace_file: Option<PathBuf>,
}

impl TraceSource {
    fn load(&self) -> Result<Vec<PageId>, SimError> {
        match (&self.trace, &self.trace_file) {
            (Some(text), _) => Ok(parse_trace(text)?),
            (None, Some(path)) => read_trace(path),
            (None, None) => Ok(Vec::new()),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum AlgorithmChoice {
    Fifo,
    Lru,
    Optimal,
    All,
}

#[derive(Subcommand)]
enum Command {
    /// Count page faults and hits for a reference string
    Paging {
        #[command(flatten)]
        source: TraceSource,

        /// Number of physical frames
        #[arg(short, long)]
        frames: usize,

        /// Replacement algorithm
        #[arg(short, long, value_enum, default_value = "all")]
        algorithm: AlgorithmChoice,

        /// Print the frame contents after every reference
        #[arg(long)]
        steps: bool,
    },
    /// Report frame counts where adding a frame increases FIFO faults
    Belady {
        #[command(flatten)]
        source: TraceSource,

        /// Largest frame count to try
        #[arg(long, default_value_t = 7)]
        max_frames: usize,
    },
    /// Run a segmentation script against a fresh segment table
    Segments {
        /// Script with one command per line
        #[arg(short, long)]
        script: PathBuf,

        /// Size of the simulated address space
        #[arg(long)]
        memory_size: Option<usize>,
    },
    /// Menu-driven session
    Interactive,
}

fn main() {
    let cli = Cli::parse();
    memsim::logging::init(cli.verbose);

    // Run the command and handle any errors
    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), SimError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Command::Paging { source, frames, algorithm, steps } => {
            let trace = source.load()?;
            log::info!("loaded trace of {} references", trace.len());
            run_paging(&trace, frames, algorithm, steps, &mut out)
        }
        Command::Belady { source, max_frames } => {
            let trace = source.load()?;
            let max_frames = max_frames.min(MAX_FRAMES);
            let anomalies = paging::belady_anomalies(&trace, max_frames)?;
            if anomalies.is_empty() {
                writeln!(out, "No Belady's anomaly for 1..={} frames", max_frames)?;
            }
            for n in anomalies {
                let fewer = paging::simulate_fifo(&trace, n)?;
                let more = paging::simulate_fifo(&trace, n + 1)?;
                writeln!(
                    out,
                    "{} frames: {} faults, {} frames: {} faults",
                    n,
                    fewer.faults,
                    n + 1,
                    more.faults
                )?;
            }
            Ok(())
        }
        Command::Segments { script, memory_size } => {
            let commands = read_script(&script)?;
            let mut table = match memory_size {
                Some(size) if size > 0 => SegmentTable::with_limits(size, MAX_SEGMENTS.max(size)),
                _ => SegmentTable::new(),
            };
            shell::run_script(&commands, &mut table, &mut out)
        }
        Command::Interactive => {
            let stdin = io::stdin();
            let mut shell = Shell::new(stdin.lock(), out);
            shell.run()
        }
    }
}

fn run_paging(
    trace: &[PageId],
    frames: usize,
    choice: AlgorithmChoice,
    steps: bool,
    out: &mut impl Write,
) -> Result<(), SimError> {
    let algorithm = match choice {
        AlgorithmChoice::Fifo => Algorithm::Fifo,
        AlgorithmChoice::Lru => Algorithm::Lru,
        AlgorithmChoice::Optimal => Algorithm::Optimal,
        AlgorithmChoice::All => {
            if steps {
                for algorithm in Algorithm::ALL {
                    write_steps(algorithm, trace, frames, out)?;
                }
            }
            return shell::write_comparison(trace, frames, out);
        }
    };

    if steps {
        write_steps(algorithm, trace, frames, out)?;
    }
    let stats = algorithm.simulate(trace, frames)?;
    writeln!(out, "{}", stats)?;
    Ok(())
}

fn write_steps(algorithm: Algorithm, trace: &[PageId], frames: usize, out: &mut impl Write) -> Result<(), SimError> {
    writeln!(out, "=== {} ({} frames) ===", algorithm, frames)?;
    for step in paging::simulate_steps(algorithm, trace, frames)? {
        writeln!(out, "{}", step)?;
    }
    writeln!(out)?;
    Ok(())
}
