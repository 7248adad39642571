//! Pointstat - Point-cloud and per-point frame series decoding.
//!
//! This crate is the data core of a browser point-cloud viewer. It decodes
//! two header-less delimited text formats straight from raw bytes, computes
//! per-point statistics across frames in a single streaming pass, and
//! serializes the combined result into an exportable report.
//!
//! # Architecture
//!
//! - `decode`: byte scanner, position decoder, frame series decoder
//! - `export`: text report writer/reader and binary snapshots
//! - `shading`: gradient coloring of frames or statistics
//! - `schema`: configuration types
//! - `session`: decode-then-swap owner of the displayed data
//!
//! # Example
//!
//! ```rust
//! use pointstat::{
//!     decode::{FrameSeriesDecoder, PositionDecoder},
//!     export::serialize,
//! };
//!
//! let positions = PositionDecoder::default().decode(b"1,2,3\n4,5,6\n").unwrap();
//! let dataset = FrameSeriesDecoder::default()
//!     .decode(b"10,20,30\n1,,3\n", positions.point_count())
//!     .unwrap();
//!
//! assert_eq!(dataset.frames_per_point(), 3);
//! assert_eq!(dataset.mean()[0], 20.0);
//!
//! let report = serialize(&positions, &dataset).unwrap();
//! assert!(report.starts_with(b"1 2 3\nMax: 30\n"));
//! ```

pub mod decode;
pub mod export;
pub mod schema;
pub mod session;
pub mod shading;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use decode::{
    DecodeError, FrameSeriesDecoder, PositionDecoder, PositionSet, Statistic, VertexDataset,
};
pub use schema::ViewerConfig;
pub use session::{SessionError, ViewerSession};
