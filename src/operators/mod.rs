//! Data-parallel frontier operators

pub mod advance;
pub mod configs;

pub use advance::block_mapped::THREADS_PER_BLOCK;
pub use advance::AdvanceStats;
pub use configs::{AdvanceConfig, AdvanceDirection, AdvanceType, LoadBalance};
