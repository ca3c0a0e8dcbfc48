use crate::constants::*;
use crate::error::SegmentError;

/// Whether a region of the address space is in use, and by whom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    Hole,
    Allocated(ProcessId),
}

/// A contiguous region of the address space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub base: usize,
    pub size: usize,
    pub state: SegmentState,
}

impl Segment {
    pub fn hole(base: usize, size: usize) -> Self {
        Segment { base, size, state: SegmentState::Hole }
    }

    pub fn allocated(base: usize, size: usize, pid: ProcessId) -> Self {
        Segment { base, size, state: SegmentState::Allocated(pid) }
    }

    #[inline]
    pub fn is_hole(&self) -> bool {
        self.state == SegmentState::Hole
    }

    #[inline]
    pub fn owner(&self) -> Option<ProcessId> {
        match self.state {
            SegmentState::Allocated(pid) => Some(pid),
            SegmentState::Hole => None,
        }
    }

    /// Last address covered by this segment (inclusive)
    #[inline]
    pub fn end(&self) -> usize {
        self.base + self.size - 1
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.state {
            SegmentState::Allocated(pid) => {
                write!(f, "[{} - {}] Allocated (PID: {})", self.base, self.end(), pid)
            }
            SegmentState::Hole => write!(f, "[{} - {}] Hole (PID: none)", self.base, self.end()),
        }
    }
}

/// A broken partition invariant, as found by [`SegmentTable::check_invariants`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    Empty,
    ZeroSized { index: usize },
    Gap { index: usize, expected_base: usize, base: usize },
    SizeMismatch { covered: usize, memory_size: usize },
    TooManySegments { count: usize, max: usize },
}

/// Result of a compaction pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompactionSummary {
    /// Allocated segments whose base address changed
    pub relocated: usize,
    /// Size of the trailing hole (0 when memory is full)
    pub hole_size: usize,
}

/// Ordered partition of a fixed address space into allocated segments and holes
///
/// Segments always cover `0..memory_size` exactly, in address order, with no
/// gaps or overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentTable {
    segments: Vec<Segment>,
    memory_size: usize,
    max_segments: usize,
}

impl SegmentTable {
    /// A freshly initialized table spanning [`MEMORY_SIZE`] units
    pub fn new() -> Self {
        Self::with_limits(MEMORY_SIZE, MAX_SEGMENTS)
    }

    /// A freshly initialized table with custom capacities
    ///
    /// # Panics
    /// If `memory_size` or `max_segments` is zero.
    pub fn with_limits(memory_size: usize, max_segments: usize) -> Self {
        assert!(memory_size > 0, "address space must not be empty");
        assert!(max_segments > 0, "segment table needs at least one entry");

        let mut table = SegmentTable {
            segments: Vec::new(),
            memory_size,
            max_segments,
        };
        table.initialize();
        table
    }

    /// Discard all segments and start over with one hole covering everything
    pub fn initialize(&mut self) {
        self.segments.clear();
        self.segments.push(Segment::hole(0, self.memory_size));
        log::debug!("segment table initialized: {} units free", self.memory_size);
    }

    /// First-fit allocation of `size` units to `pid`
    ///
    /// The chosen hole is split into the new segment and, if anything is
    /// left over, a smaller hole right after it. On error nothing changes.
    pub fn allocate(&mut self, pid: ProcessId, size: usize) -> Result<Segment, SegmentError> {
        if size == 0 {
            return Err(SegmentError::ZeroSize);
        }

        let Some(index) = self
            .segments
            .iter()
            .position(|seg| seg.is_hole() && seg.size >= size)
        else {
            let err = SegmentError::Fragmentation {
                pid,
                requested: size,
                largest_hole: self.largest_hole(),
                free: self.free_space(),
            };
            log::warn!("{}", err);
            return Err(err);
        };

        let hole = self.segments[index];
        let residual = hole.size - size;
        if residual > 0 && self.segments.len() >= self.max_segments {
            return Err(SegmentError::TableFull(self.max_segments));
        }

        let segment = Segment::allocated(hole.base, size, pid);
        self.segments[index] = segment;
        if residual > 0 {
            self.segments
                .insert(index + 1, Segment::hole(hole.base + size, residual));
        }

        log::debug!(
            "allocated [{} - {}] to process {} ({} units left in hole)",
            segment.base,
            segment.end(),
            pid,
            residual
        );
        self.debug_check();
        Ok(segment)
    }

    /// Free every segment owned by `pid`, merging neighbouring holes
    ///
    /// Returns the number of units released.
    pub fn release(&mut self, pid: ProcessId) -> Result<usize, SegmentError> {
        let mut freed = 0;
        for seg in self.segments.iter_mut() {
            if seg.owner() == Some(pid) {
                seg.state = SegmentState::Hole;
                freed += seg.size;
            }
        }
        if freed == 0 {
            return Err(SegmentError::UnknownProcess(pid));
        }

        self.coalesce();
        log::debug!("released {} units held by process {}", freed, pid);
        self.debug_check();
        Ok(freed)
    }

    fn coalesce(&mut self) {
        let mut merged: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for seg in self.segments.drain(..) {
            match merged.last_mut() {
                Some(prev) if prev.is_hole() && seg.is_hole() => prev.size += seg.size,
                _ => merged.push(seg),
            }
        }
        self.segments = merged;
    }

    /// Slide every allocated segment down to the lowest free address and
    /// gather all free space into one trailing hole
    ///
    /// Allocated segments keep their relative order.
    pub fn compact(&mut self) -> CompactionSummary {
        let mut compacted = Vec::with_capacity(self.segments.len());
        let mut current_base = 0;
        let mut relocated = 0;

        for seg in self.segments.iter().filter(|seg| !seg.is_hole()) {
            if seg.base != current_base {
                relocated += 1;
            }
            compacted.push(Segment { base: current_base, ..*seg });
            current_base += seg.size;
        }

        let hole_size = self.memory_size - current_base;
        if hole_size > 0 {
            compacted.push(Segment::hole(current_base, hole_size));
        }

        self.segments = compacted;
        log::info!(
            "memory compacted: {} segment(s) relocated, {} units free",
            relocated,
            hole_size
        );
        self.debug_check();
        CompactionSummary { relocated, hole_size }
    }

    /// Printable listing of the table, one segment per line
    pub fn display(&self) -> MemoryMap<'_> {
        MemoryMap { segments: &self.segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    pub fn free_space(&self) -> usize {
        self.holes().map(|seg| seg.size).sum()
    }

    pub fn allocated_space(&self) -> usize {
        self.memory_size - self.free_space()
    }

    pub fn largest_hole(&self) -> usize {
        self.holes().map(|seg| seg.size).max().unwrap_or(0)
    }

    pub fn hole_count(&self) -> usize {
        self.holes().count()
    }

    /// Share of free memory unusable by a request for the largest hole + 1:
    /// `1 - largest_hole / free_space`, or 0 when nothing is free
    pub fn external_fragmentation(&self) -> f64 {
        let free = self.free_space();
        if free == 0 {
            return 0.0;
        }
        1.0 - self.largest_hole() as f64 / free as f64
    }

    fn holes(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().filter(|seg| seg.is_hole())
    }

    /// Verify the table is an ordered, gap-free partition of the address space
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.segments.is_empty() {
            return Err(InvariantViolation::Empty);
        }
        if self.segments.len() > self.max_segments {
            return Err(InvariantViolation::TooManySegments {
                count: self.segments.len(),
                max: self.max_segments,
            });
        }

        let mut expected_base = 0;
        for (index, seg) in self.segments.iter().enumerate() {
            if seg.size == 0 {
                return Err(InvariantViolation::ZeroSized { index });
            }
            if seg.base != expected_base {
                return Err(InvariantViolation::Gap {
                    index,
                    expected_base,
                    base: seg.base,
                });
            }
            expected_base += seg.size;
        }

        if expected_base != self.memory_size {
            return Err(InvariantViolation::SizeMismatch {
                covered: expected_base,
                memory_size: self.memory_size,
            });
        }
        Ok(())
    }

    #[inline]
    fn debug_check(&self) {
        debug_assert_eq!(self.check_invariants(), Ok(()));
    }
}

impl Default for SegmentTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed view of a segment table rendered as a memory map
#[derive(Debug, Clone, Copy)]
pub struct MemoryMap<'a> {
    segments: &'a [Segment],
}

impl MemoryMap<'_> {
    pub fn segments(&self) -> &[Segment] {
        self.segments
    }
}

impl std::fmt::Display for MemoryMap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "-- Memory State --")?;
        for seg in self.segments {
            writeln!(f, "{}", seg)?;
        }
        Ok(())
    }
}
