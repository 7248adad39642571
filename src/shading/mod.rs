//! Shading module - Gradient coloring of per-point readings.

mod color;
mod gradient;

pub use color::*;
pub use gradient::*;
