//! Export module - Text reports and binary snapshots of decoded data.

mod report;
mod snapshot;

pub use report::*;
pub use snapshot::*;
