mod retry;
mod sequence_allocator;

pub use retry::*;
pub use sequence_allocator::*;
