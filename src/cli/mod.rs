pub mod counters;
pub mod io;
pub mod opts;

/// Count type for all global accumulators.
pub type BigCount = u64;
