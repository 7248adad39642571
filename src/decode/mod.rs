//! Decode module - Byte-level decoders for point clouds and frame series.

mod error;
mod frames;
mod number;
mod position;
mod scanner;
mod stats;

pub use error::*;
pub use frames::*;
pub use number::*;
pub use position::*;
pub use scanner::*;
pub use stats::*;
