use crate::constants::*;
use crate::error::PagingError;
use crate::memory::FrameSet;

/// Fault/hit tally of one simulation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingStats {
    pub faults: usize,
    pub hits: usize,
}

impl PagingStats {
    /// Number of references processed
    #[inline]
    pub fn total(&self) -> usize {
        self.faults + self.hits
    }

    pub fn hit_ratio(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.hits as f64 / self.total() as f64
    }

    pub fn fault_ratio(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.faults as f64 / self.total() as f64
    }
}

impl std::fmt::Display for PagingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Page Hits: {}\nPage Faults: {}", self.hits, self.faults)
    }
}

/// Page-replacement algorithm selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    Fifo,
    Lru,
    Optimal,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Fifo, Algorithm::Lru, Algorithm::Optimal];

    /// Run this algorithm over `trace` with `frame_count` frames
    pub fn simulate(self, trace: &[PageId], frame_count: usize) -> Result<PagingStats, PagingError> {
        match self {
            Algorithm::Fifo => simulate_fifo(trace, frame_count),
            Algorithm::Lru => simulate_lru(trace, frame_count),
            Algorithm::Optimal => simulate_optimal(trace, frame_count),
        }
    }

    fn policy(self, frame_count: usize) -> Box<dyn ReplacementPolicy> {
        match self {
            Algorithm::Fifo => Box::new(Fifo::new(frame_count)),
            Algorithm::Lru => Box::new(Lru::new(frame_count)),
            Algorithm::Optimal => Box::new(Optimal),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Algorithm::Fifo => "FIFO",
            Algorithm::Lru => "LRU",
            Algorithm::Optimal => "Optimal",
        };
        f.write_str(name)
    }
}

/// Outcome of a single page reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Hit { slot: usize },
    Fault { slot: usize, evicted: Option<PageId> },
}

impl Access {
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, Access::Hit { .. })
    }

    #[inline]
    pub fn slot(&self) -> usize {
        match *self {
            Access::Hit { slot } | Access::Fault { slot, .. } => slot,
        }
    }
}

/// One recorded reference: what was asked for, what happened, and the
/// resulting frame contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub position: usize,
    pub page: PageId,
    pub access: Access,
    pub frames: FrameSet,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.access {
            Access::Hit { slot } => {
                write!(f, "ref {:>3} -> {} hit   (frame {})", self.page, self.frames, slot)
            }
            Access::Fault { slot, evicted: Some(old) } => write!(
                f,
                "ref {:>3} -> {} fault (frame {}, evicted {})",
                self.page, self.frames, slot, old
            ),
            Access::Fault { slot, evicted: None } => write!(
                f,
                "ref {:>3} -> {} fault (frame {})",
                self.page, self.frames, slot
            ),
        }
    }
}

/// Victim selection for one replacement algorithm
///
/// The simulation loop owns hit detection and bookkeeping; a policy only
/// decides which slot to overwrite on a fault and observes every use.
pub trait ReplacementPolicy {
    /// Choose the slot to overwrite when `trace[position]` faults
    fn victim(&mut self, frames: &FrameSet, trace: &[PageId], position: usize) -> usize;

    /// A slot was just used, either by a hit or by installing a page
    fn touched(&mut self, _slot: usize) {}
}

/// Round-robin overwrite, regardless of recency of use
#[derive(Debug, Clone)]
pub struct Fifo {
    cursor: usize,
    frame_count: usize,
}

impl Fifo {
    pub fn new(frame_count: usize) -> Self {
        Fifo { cursor: 0, frame_count }
    }
}

impl ReplacementPolicy for Fifo {
    fn victim(&mut self, _frames: &FrameSet, _trace: &[PageId], _position: usize) -> usize {
        let slot = self.cursor;
        self.cursor = (self.cursor + 1) % self.frame_count;
        slot
    }
}

/// Least recently used, tracked with a logical clock per slot
#[derive(Debug, Clone)]
pub struct Lru {
    last_used: Vec<u64>,
    clock: u64,
}

impl Lru {
    pub fn new(frame_count: usize) -> Self {
        Lru {
            last_used: vec![0; frame_count],
            clock: 0,
        }
    }
}

impl ReplacementPolicy for Lru {
    fn victim(&mut self, frames: &FrameSet, _trace: &[PageId], _position: usize) -> usize {
        // Empty slots are older than any timestamp
        if let Some(slot) = frames.first_empty() {
            return slot;
        }

        let mut lru_index = 0;
        for slot in 1..self.last_used.len() {
            if self.last_used[slot] < self.last_used[lru_index] {
                lru_index = slot;
            }
        }
        lru_index
    }

    fn touched(&mut self, slot: usize) {
        self.last_used[slot] = self.clock;
        self.clock += 1;
    }
}

/// Belady's optimal replacement: evict the page used farthest in the future
#[derive(Debug, Clone, Copy, Default)]
pub struct Optimal;

impl ReplacementPolicy for Optimal {
    fn victim(&mut self, frames: &FrameSet, trace: &[PageId], position: usize) -> usize {
        let future = &trace[position + 1..];
        let mut replace_index = 0;
        let mut farthest: Option<usize> = None;

        for slot in 0..frames.capacity() {
            let next_use = frames
                .get(slot)
                .and_then(|page| future.iter().position(|&p| p == page));

            match next_use {
                // Never referenced again (or empty): nothing can beat this slot
                None => return slot,
                Some(distance) => {
                    if farthest.is_none_or(|best| distance > best) {
                        farthest = Some(distance);
                        replace_index = slot;
                    }
                }
            }
        }
        replace_index
    }
}

/// Reject inputs the engine has no capacity for
pub fn validate(trace: &[PageId], frame_count: usize) -> Result<(), PagingError> {
    if frame_count == 0 {
        return Err(PagingError::NoFrames);
    }
    if frame_count > MAX_FRAMES {
        return Err(PagingError::TooManyFrames(frame_count));
    }
    if trace.len() > MAX_TRACE_LEN {
        return Err(PagingError::TraceTooLong(trace.len()));
    }
    Ok(())
}

/// Drive a policy over the whole trace, optionally recording every step
fn run<P: ReplacementPolicy + ?Sized>(
    policy: &mut P,
    trace: &[PageId],
    frame_count: usize,
    mut steps: Option<&mut Vec<Step>>,
) -> PagingStats {
    let mut frames = FrameSet::new(frame_count);
    let mut stats = PagingStats::default();

    for (position, &page) in trace.iter().enumerate() {
        let access = match frames.find(page) {
            Some(slot) => {
                stats.hits += 1;
                Access::Hit { slot }
            }
            None => {
                let slot = policy.victim(&frames, trace, position);
                let evicted = frames.install(slot, page);
                stats.faults += 1;
                if let Some(old) = evicted {
                    log::trace!("page {} evicted page {} from frame {}", page, old, slot);
                }
                Access::Fault { slot, evicted }
            }
        };
        policy.touched(access.slot());

        if let Some(steps) = steps.as_deref_mut() {
            steps.push(Step {
                position,
                page,
                access,
                frames: frames.clone(),
            });
        }
    }

    stats
}

fn simulate_with<P: ReplacementPolicy>(
    name: Algorithm,
    mut policy: P,
    trace: &[PageId],
    frame_count: usize,
) -> Result<PagingStats, PagingError> {
    validate(trace, frame_count)?;
    let stats = run(&mut policy, trace, frame_count, None);
    log::debug!(
        "{} with {} frames over {} references: {} faults, {} hits",
        name,
        frame_count,
        trace.len(),
        stats.faults,
        stats.hits
    );
    Ok(stats)
}

/// First-in first-out replacement
pub fn simulate_fifo(trace: &[PageId], frame_count: usize) -> Result<PagingStats, PagingError> {
    simulate_with(Algorithm::Fifo, Fifo::new(frame_count), trace, frame_count)
}

/// Least-recently-used replacement
pub fn simulate_lru(trace: &[PageId], frame_count: usize) -> Result<PagingStats, PagingError> {
    simulate_with(Algorithm::Lru, Lru::new(frame_count), trace, frame_count)
}

/// Optimal (clairvoyant) replacement
pub fn simulate_optimal(trace: &[PageId], frame_count: usize) -> Result<PagingStats, PagingError> {
    simulate_with(Algorithm::Optimal, Optimal, trace, frame_count)
}

/// Run an algorithm and keep a snapshot of the frames after every reference
pub fn simulate_steps(
    algorithm: Algorithm,
    trace: &[PageId],
    frame_count: usize,
) -> Result<Vec<Step>, PagingError> {
    validate(trace, frame_count)?;
    let mut policy = algorithm.policy(frame_count);
    let mut steps = Vec::with_capacity(trace.len());
    run(policy.as_mut(), trace, frame_count, Some(&mut steps));
    Ok(steps)
}

/// Run every algorithm over the same input
pub fn compare(trace: &[PageId], frame_count: usize) -> Result<Vec<(Algorithm, PagingStats)>, PagingError> {
    Algorithm::ALL
        .iter()
        .map(|&algorithm| {
            algorithm
                .simulate(trace, frame_count)
                .map(|stats| (algorithm, stats))
        })
        .collect()
}

/// Frame counts `n` in `1..max_frames` where FIFO faults more with `n + 1`
/// frames than with `n`
pub fn belady_anomalies(trace: &[PageId], max_frames: usize) -> Result<Vec<usize>, PagingError> {
    let faults = (1..=max_frames)
        .map(|n| simulate_fifo(trace, n).map(|stats| stats.faults))
        .collect::<Result<Vec<_>, _>>()?;

    let anomalies: Vec<usize> = faults
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1] > pair[0])
        .map(|(i, _)| i + 1)
        .collect();

    if !anomalies.is_empty() {
        log::info!("Belady's anomaly at frame counts {:?}", anomalies);
    }
    Ok(anomalies)
}
