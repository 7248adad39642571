//! Schema module - Configuration types for the viewer core.

mod config;

pub use config::*;
