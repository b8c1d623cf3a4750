pub mod batch;
pub mod pool;

pub use batch::{batch_ranges, map_in_batches};
pub use pool::WorkerPool;
