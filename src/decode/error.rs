//! Decode failures shared by the position and frame series decoders.

/// Structural or numeric failure while decoding a byte buffer.
///
/// A decode that returns one of these publishes nothing: callers keep
/// whatever dataset they held before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid number {token:?} at byte offset {offset}")]
    InvalidNumber { offset: usize, token: String },
    #[error("Position stream holds {values} values, which is not a whole number of points")]
    MalformedPointCount { values: usize },
    #[error("Frame series has {found} rows but geometry has {expected} points")]
    PointCountMismatch { expected: usize, found: usize },
    #[error("Point {point} has more than {frames_per_point} readings")]
    RowOverflow { point: usize, frames_per_point: usize },
    #[error("Cannot combine {positions} positions with statistics for {statistics} points")]
    SizeMismatch { positions: usize, statistics: usize },
}
