pub mod constants;
pub mod error;
pub mod io;
pub mod logging;
pub mod memory;
pub mod paging;
pub mod segmentation;
pub mod shell;

// Re-export commonly used items for convenience
pub use constants::*;
pub use error::{PagingError, ParseError, SegmentError, SimError};
pub use paging::{Algorithm, PagingStats, simulate_fifo, simulate_lru, simulate_optimal};
pub use segmentation::{Segment, SegmentState, SegmentTable};
