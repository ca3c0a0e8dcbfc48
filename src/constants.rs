// Paging engine capacities
pub const MAX_TRACE_LEN: usize = 100;
pub const MAX_FRAMES: usize = 100;

// Segment allocator address space, in abstract memory units
pub const MEMORY_SIZE: usize = 1000;
// every segment is at least one unit long, so the table can never need more
pub const MAX_SEGMENTS: usize = MEMORY_SIZE;

pub type PageId = u32;
pub type ProcessId = u32;
